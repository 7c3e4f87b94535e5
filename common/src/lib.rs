//! Shared building blocks for the snake client workspace.
//!
//! Every error type in the workspace carries an [`ErrorLocation`] so a log line
//! points straight at the code that produced the failure.

pub mod error;

pub use error::error_location::ErrorLocation;
