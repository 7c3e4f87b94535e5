use common::ErrorLocation;

use thiserror::Error;

/// Startup and run failures of the snake client binary.
///
/// Library errors are flattened into a message here; the location records
/// where the binary gave up, not where the library failed.
#[derive(Debug, Error)]
pub enum SnakeError {
    /// Error from this App
    #[error("Snake Error: {message} {location}")]
    Snake {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Error from game-core operations (schema, connect, run)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}
