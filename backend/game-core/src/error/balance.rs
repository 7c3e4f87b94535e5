use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BalanceError {
    #[error("HTTP Error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },

    #[error("RPC Error {code}: {message} {location}")]
    Rpc {
        code: i64,
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Balance: {message} {location}")]
    InvalidResult {
        message: String,
        location: ErrorLocation,
    },
}

impl BalanceError {
    #[track_caller]
    pub fn invalid_result(message: impl Into<String>) -> Self {
        BalanceError::InvalidResult {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for BalanceError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        BalanceError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for BalanceError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        BalanceError::Http {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for BalanceError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        BalanceError::Json {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
