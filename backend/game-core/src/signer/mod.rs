//! The wallet: an external authority that owns the player's key.
//!
//! The engine needs exactly two things from it: the account address and a
//! signature over a challenge text. Both may take as long as the player takes to
//! answer a prompt, and both may be refused.

mod command;

pub use command::{CommandSigner, REJECTED_EXIT_CODE};

use crate::error::signer::SignerError;

use std::future::Future;
use std::sync::Arc;

use models::{Address, Signature};

/// Signing capability used by the handshake.
pub trait Signer: Send + Sync {
    /// Ask the wallet which account to use.
    fn request_address(&self) -> impl Future<Output = Result<Address, SignerError>> + Send;

    /// Sign `challenge_text` with the key behind `address`.
    fn sign(
        &self,
        challenge_text: &str,
        address: &Address,
    ) -> impl Future<Output = Result<Signature, SignerError>> + Send;
}

impl<S: Signer> Signer for Arc<S> {
    fn request_address(&self) -> impl Future<Output = Result<Address, SignerError>> + Send {
        (**self).request_address()
    }

    fn sign(
        &self,
        challenge_text: &str,
        address: &Address,
    ) -> impl Future<Output = Result<Signature, SignerError>> + Send {
        (**self).sign(challenge_text, address)
    }
}
