//! Domain models for the snake game client.
//!
//! Pure data: wallet addresses, signatures, the challenge that gets signed and
//! the session record that gets cached. Behaviour lives in `game-core`.

pub mod address;
pub mod auth_challenge;
pub mod error;
pub mod session_record;
pub mod signature;

pub use address::Address;
pub use auth_challenge::{AuthChallenge, CHALLENGE_DELIMITER};
pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use session_record::builder::SessionRecordBuilder;
pub use session_record::{AUTH_ACK_MESSAGE_TYPE, SessionRecord};
pub use signature::Signature;
