//! Errors raised by the schema registry and the message codec.
//!
//! `SchemaError` is fatal at startup. `DecodeError` and `EncodeError` are local to one
//! frame: the caller logs them and moves on.

use common::ErrorLocation;

use std::fmt;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("Schema Parse Error: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Schema Missing Type Error: {type_name} {location}")]
    MissingType {
        type_name: String,
        location: ErrorLocation,
    },
}

impl SchemaError {
    #[track_caller]
    pub fn parse(message: impl Into<String>) -> Self {
        SchemaError::Parse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<prost::DecodeError> for SchemaError {
    #[track_caller]
    fn from(error: prost::DecodeError) -> Self {
        SchemaError::Parse {
            message: format!("invalid descriptor set: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error("Decode Error: unknown type '{type_name}' {location}")]
    UnknownType {
        type_name: String,
        location: ErrorLocation,
    },

    #[error("Decode Error: '{type_name}': {reason} {location}")]
    Malformed {
        type_name: String,
        reason: String,
        location: ErrorLocation,
    },
}

impl DecodeError {
    #[track_caller]
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        DecodeError::UnknownType {
            type_name: type_name.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            type_name: type_name.into(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum EncodeError {
    #[error("Encode Error: unknown type '{type_name}' {location}")]
    UnknownType {
        type_name: String,
        location: ErrorLocation,
    },

    #[error("Encode Error: '{type_name}' failed verification: {} {location}", format_violations(.violations))]
    Validation {
        type_name: String,
        violations: Vec<FieldViolation>,
        location: ErrorLocation,
    },
}

impl EncodeError {
    #[track_caller]
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        EncodeError::UnknownType {
            type_name: type_name.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation(type_name: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        EncodeError::Validation {
            type_name: type_name.into(),
            violations,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Every field that failed verification; empty for `UnknownType`.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            EncodeError::Validation { violations, .. } => violations,
            EncodeError::UnknownType { .. } => &[],
        }
    }
}

/// One field that did not match its schema declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: ViolationReason,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: ViolationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Why a field failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    UnknownField,
    TypeMismatch { expected: &'static str, actual: &'static str },
    OutOfRange { expected: &'static str },
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField => write!(f, "not declared in schema"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "{} expected, got {}", expected, actual)
            }
            Self::OutOfRange { expected } => write!(f, "value out of range for {}", expected),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
