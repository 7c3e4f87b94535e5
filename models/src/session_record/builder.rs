use crate::{AUTH_ACK_MESSAGE_TYPE, Address, AuthChallenge, ErrorLocation, ModelError, SessionRecord, Signature};

use std::panic::Location;

/// Builder for validated [`SessionRecord`] instances.
///
/// The message type is always the AuthAck discriminator; callers only supply the
/// challenge parts and the signature.
#[derive(Debug, Default)]
pub struct SessionRecordBuilder {
    wallet: Option<Address>,
    uuid: Option<String>,
    nonce: Option<String>,
    sign: Option<Signature>,
}

impl SessionRecordBuilder {
    pub fn with_wallet(mut self, wallet: Address) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Copies wallet, uuid and nonce from a signed challenge.
    pub fn with_challenge(self, challenge: &AuthChallenge) -> Self {
        self.with_wallet(challenge.wallet().clone())
            .with_uuid(challenge.uuid())
            .with_nonce(challenge.nonce())
    }

    pub fn with_signature(mut self, sign: Signature) -> Self {
        self.sign = Some(sign);
        self
    }

    /// Build the SessionRecord with validation.
    #[track_caller]
    pub fn build(self) -> Result<SessionRecord, ModelError> {
        let wallet = self.wallet.ok_or_else(|| ModelError::Validation {
            message: String::from("Wallet is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let uuid = self.uuid.ok_or_else(|| ModelError::Validation {
            message: String::from("UUID is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if uuid.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("UUID cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let nonce = self.nonce.ok_or_else(|| ModelError::Validation {
            message: String::from("Nonce is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if nonce.is_empty() || !nonce.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ModelError::Validation {
                message: format!("Nonce must be non-empty hex: {nonce:?}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let sign = self.sign.ok_or_else(|| ModelError::Validation {
            message: String::from("Signature is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(SessionRecord {
            wallet,
            uuid,
            nonce,
            message_type: AUTH_ACK_MESSAGE_TYPE,
            sign,
        })
    }
}
