use common::ErrorLocation;

use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Session Write Error: {path}: {source} {location}")]
    Write {
        path: PathBuf,
        #[source]
        source: IoError,
        location: ErrorLocation,
    },

    #[error("Session Serialization Error: {reason} {location}")]
    Serialize {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Session Slot Error: {message} {location}")]
    Slot {
        message: String,
        location: ErrorLocation,
    },
}
