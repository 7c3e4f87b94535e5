use game_core::engine::ConnectionState;
use game_core::error::codec::{DecodeError, EncodeError, FieldViolation, ViolationReason};
use game_core::error::engine::EngineError;
use game_core::error::signer::SignerError;
use game_core::error::transport::TransportError;
use game_core::error::CoreError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies `#[track_caller]` constructors record the caller's file.
///
/// **WHY THIS MATTERS**: Signer failures originate in several places; the log line must say
/// which.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from a constructor, which
/// would make every error point at the error module itself.
#[test]
fn given_signer_error_when_formatted_then_location_is_call_site() {
    // GIVEN
    let err = SignerError::rejected("user declined");

    // WHEN
    let error_string = err.to_string();

    // THEN
    assert!(error_string.contains("Signer Rejected"));
    assert!(error_string.contains("user declined"));
    assert!(error_string.contains("error.rs"), "got: {error_string}");
    assert!(err.is_rejected());
}

/// **VALUE**: Verifies decode errors name the message type and reason.
///
/// **WHY THIS MATTERS**: Dropped frames are only visible through these warn lines.
///
/// **BUG THIS CATCHES**: Would catch the Display format losing the type name.
#[test]
fn given_malformed_decode_error_when_formatted_then_includes_type_and_reason() {
    let err = DecodeError::malformed("Profile", "field 'energies' truncated");

    let error_string = err.to_string();

    assert!(error_string.contains("'Profile'"));
    assert!(error_string.contains("field 'energies' truncated"));
    assert!(error_string.contains("error.rs"));
}

/// **VALUE**: Verifies validation errors list every violation in their message.
///
/// **WHY THIS MATTERS**: The log line is the only place a developer sees what was wrong.
///
/// **BUG THIS CATCHES**: Would catch violations being collected but not displayed.
#[test]
fn given_validation_error_when_formatted_then_lists_all_violations() {
    let err = EncodeError::validation(
        "ClientAuth",
        vec![
            FieldViolation::new("wallet", ViolationReason::TypeMismatch { expected: "string", actual: "int" }),
            FieldViolation::new("extra", ViolationReason::UnknownField),
        ],
    );

    let error_string = err.to_string();

    assert!(error_string.contains("wallet: string expected, got int"));
    assert!(error_string.contains("extra: not declared in schema"));
    assert_eq!(err.violations().len(), 2);
}

/// **VALUE**: Verifies engine state errors name the operation and state.
///
/// **WHY THIS MATTERS**: "cannot connect while ready" tells the caller exactly what went wrong.
///
/// **BUG THIS CATCHES**: Would catch ConnectionState's Display regressing to Debug output.
#[test]
fn given_invalid_state_error_when_formatted_then_names_operation_and_state() {
    let err = EngineError::InvalidState {
        operation: "connect",
        state: ConnectionState::Ready,
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().contains("cannot connect while ready"));
}

/// **VALUE**: Verifies wrapped errors display transparently through `CoreError`.
///
/// **WHY THIS MATTERS**: Callers log `CoreError` directly.
///
/// **BUG THIS CATCHES**: Would catch a wrapper adding noise or hiding the inner message.
#[test]
fn given_transport_error_when_wrapped_in_core_error_then_display_unchanged() {
    let inner = TransportError::closed();
    let inner_string = inner.to_string();

    let wrapped = CoreError::from(inner);

    assert_eq!(wrapped.to_string(), inner_string);
    assert!(inner_string.starts_with("Transport Closed ["));
}
