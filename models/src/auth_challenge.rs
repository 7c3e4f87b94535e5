use crate::Address;

/// Separator between the parts of the signed challenge text.
pub const CHALLENGE_DELIMITER: char = ':';

/// The tuple a wallet signs to prove ownership of an address for one server challenge.
///
/// Built once per handshake attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    wallet: Address,
    uuid: String,
    nonce: String,
}

impl AuthChallenge {
    pub fn new(wallet: Address, uuid: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            wallet,
            uuid: uuid.into(),
            nonce: nonce.into(),
        }
    }

    pub fn wallet(&self) -> &Address {
        &self.wallet
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// `wallet:uuid:nonce`, in that order. The server verifies against the same text.
    pub fn challenge_text(&self) -> String {
        format!(
            "{}{CHALLENGE_DELIMITER}{}{CHALLENGE_DELIMITER}{}",
            self.wallet, self.uuid, self.nonce
        )
    }
}
