use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport Closed {location}")]
    Closed { location: ErrorLocation },
}

impl TransportError {
    #[track_caller]
    pub fn closed() -> Self {
        TransportError::Closed {
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    #[track_caller]
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::Connect {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
