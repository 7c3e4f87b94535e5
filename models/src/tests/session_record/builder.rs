use crate::{AUTH_ACK_MESSAGE_TYPE, Address, AuthChallenge, ModelError, SessionRecordBuilder, Signature};

fn wallet() -> Address {
    Address::parse("0x00000000000000000000000000000000000000aa").expect("valid")
}

/// **VALUE**: Verifies a record built from a challenge carries its parts and the AuthAck type.
///
/// **WHY THIS MATTERS**: The record is sent as the `ClientAuth` message; a wrong `type` makes
/// the server ignore it.
///
/// **BUG THIS CATCHES**: Would catch the builder forgetting to stamp the message type.
#[test]
fn given_challenge_and_signature_when_building_then_record_is_auth_ack() {
    // GIVEN: A challenge and a signature
    let challenge = AuthChallenge::new(wallet(), "uuid-1", "ff");
    let sign = Signature::new("0xsig").expect("non-empty");

    // WHEN: Building
    let record = SessionRecordBuilder::default()
        .with_challenge(&challenge)
        .with_signature(sign)
        .build()
        .expect("valid record");

    // THEN
    assert_eq!(record.message_type, AUTH_ACK_MESSAGE_TYPE);
    assert_eq!(record.wallet, wallet());
    assert_eq!(record.uuid, "uuid-1");
    assert_eq!(record.nonce, "ff");
}

/// **VALUE**: Verifies the signature is required.
///
/// **WHY THIS MATTERS**: An unsigned record must never be persisted or sent.
///
/// **BUG THIS CATCHES**: Would catch the signature becoming optional.
#[test]
fn given_missing_signature_when_building_then_returns_validation_error() {
    let result = SessionRecordBuilder::default()
        .with_wallet(wallet())
        .with_uuid("uuid-1")
        .with_nonce("ff")
        .build();

    match result {
        Err(ModelError::Validation { message, .. }) => assert_eq!(message, "Signature is required"),
        Ok(_) => panic!("record without signature must not build"),
    }
}

/// **VALUE**: Verifies non-hex nonces are rejected.
///
/// **WHY THIS MATTERS**: Nonces are rendered in base 16; anything else indicates a bug upstream.
///
/// **BUG THIS CATCHES**: Would catch a decimal rendering slipping through.
#[test]
fn given_non_hex_nonce_when_building_then_returns_validation_error() {
    let result = SessionRecordBuilder::default()
        .with_wallet(wallet())
        .with_uuid("uuid-1")
        .with_nonce("xyz")
        .with_signature(Signature::new("0xsig").expect("non-empty"))
        .build();

    match result {
        Err(ModelError::Validation { message, .. }) => assert!(message.starts_with("Nonce must be")),
        Ok(_) => panic!("non-hex nonce must not build"),
    }
}

/// **VALUE**: Verifies an empty UUID is rejected.
///
/// **BUG THIS CATCHES**: Would catch a handshake against a challenge the server never issued.
#[test]
fn given_empty_uuid_when_building_then_returns_validation_error() {
    let result = SessionRecordBuilder::default()
        .with_wallet(wallet())
        .with_uuid("")
        .with_nonce("ff")
        .with_signature(Signature::new("0xsig").expect("non-empty"))
        .build();

    assert!(result.is_err());
}
