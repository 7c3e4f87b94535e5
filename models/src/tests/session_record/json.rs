use crate::{Address, SessionRecord, SessionRecordBuilder, Signature};

use serde_json::Value;

fn record() -> SessionRecord {
    SessionRecordBuilder::default()
        .with_wallet(Address::parse("0x00000000000000000000000000000000000000aa").expect("valid"))
        .with_uuid("uuid-1")
        .with_nonce("1a2b")
        .with_signature(Signature::new("0xsig").expect("non-empty"))
        .build()
        .expect("valid record")
}

/// **VALUE**: Verifies the persisted JSON uses the wire field names, including `type`.
///
/// **WHY THIS MATTERS**: Sessions cached by earlier client versions use exactly these keys.
///
/// **BUG THIS CATCHES**: Would catch the `type` rename being dropped (`message_type` on disk).
#[test]
fn given_record_when_serialized_then_uses_wire_keys() {
    // WHEN: Serializing
    let value: Value = serde_json::to_value(record()).expect("serializable");

    // THEN: Exactly the wire keys
    let object = value.as_object().expect("object");
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["nonce", "sign", "type", "uuid", "wallet"]);
    assert_eq!(object["type"], 2);
    assert_eq!(object["sign"], "0xsig");
}

/// **VALUE**: Verifies a stored record reads back equal.
///
/// **BUG THIS CATCHES**: Would catch asymmetric serde attributes on Address or Signature.
#[test]
fn given_serialized_record_when_deserialized_then_equals_original() {
    let json = serde_json::to_string(&record()).expect("serializable");

    let restored: SessionRecord = serde_json::from_str(&json).expect("parseable");

    assert_eq!(restored, record());
}

/// **VALUE**: Verifies a stored record with an invalid wallet fails to parse.
///
/// **WHY THIS MATTERS**: The session store relies on parse failure to treat tampered data as
/// "no session".
///
/// **BUG THIS CATCHES**: Would catch Address deserializing without validation.
#[test]
fn given_record_with_bad_wallet_when_deserialized_then_fails() {
    let json = r#"{"wallet":"nope","uuid":"u","nonce":"1","type":2,"sign":"0xsig"}"#;

    assert!(serde_json::from_str::<SessionRecord>(json).is_err());
}
