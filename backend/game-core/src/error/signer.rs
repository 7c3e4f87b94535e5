use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failure of the external signing capability.
///
/// Either way the current handshake attempt is abandoned and the connection stays
/// unauthenticated.
#[derive(Debug, ThisError)]
pub enum SignerError {
    #[error("Signer Rejected: {message} {location}")]
    Rejected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Signer Unavailable: {message} {location}")]
    Unavailable {
        message: String,
        location: ErrorLocation,
    },
}

impl SignerError {
    #[track_caller]
    pub fn rejected(message: impl Into<String>) -> Self {
        SignerError::Rejected {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        SignerError::Unavailable {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SignerError::Rejected { .. })
    }
}
