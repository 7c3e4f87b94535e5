use crate::engine::ConnectionState;
use crate::error::transport::TransportError;

use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum EngineError {
    #[error("Invalid State Error: cannot {operation} while {state} {location}")]
    InvalidState {
        operation: &'static str,
        state: ConnectionState,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
