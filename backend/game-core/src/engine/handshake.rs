//! Challenge–response authentication.
//!
//! The server opens with a `UUIDValidation` challenge. The client answers with a
//! `ClientAuth` carrying a wallet signature over `wallet:uuid:nonce`. A signed
//! answer is cached and replayed on later challenges so the player is prompted
//! at most once.

use crate::codec::{AUTH_ACK_TYPE, CHALLENGE_REQUEST_TYPE, ENVELOPE_TYPE_FIELD, Record};
use crate::engine::{ConnectionState, ProtocolEngine};
use crate::error::CoreError;
use crate::error::codec::DecodeError;
use crate::session_store::SessionStore;
use crate::signer::Signer;

use log::{debug, info, warn};
use models::{AuthChallenge, SessionRecord, SessionRecordBuilder};
use rand::Rng;

const UUID_FIELD: &str = "uuid";

/// Nonces are drawn from `[1, NONCE_UPPER_BOUND)`.
pub const NONCE_UPPER_BOUND: u32 = 1_000_000_000;

/// Fresh nonce: a uniform integer in `[1, NONCE_UPPER_BOUND)` as lowercase hex.
pub fn generate_nonce() -> String {
    let value = rand::rng().random_range(1..NONCE_UPPER_BOUND);
    format!("{value:x}")
}

/// `ClientAuth` fields for a signed record.
pub fn ack_fields(record: &SessionRecord) -> Record {
    Record::new()
        .with(ENVELOPE_TYPE_FIELD, record.message_type)
        .with("wallet", record.wallet.as_str())
        .with("uuid", record.uuid.as_str())
        .with("nonce", record.nonce.as_str())
        .with("sign", record.sign.as_str())
}

impl<S: SessionStore, G: Signer> ProtocolEngine<S, G> {
    pub(crate) async fn handle_challenge(&mut self, frame: &[u8]) -> Result<(), CoreError> {
        let request = self.codec.decode(CHALLENGE_REQUEST_TYPE, frame)?;
        let uuid = match request.get_str(UUID_FIELD) {
            Some(uuid) if !uuid.trim().is_empty() => uuid.to_string(),
            _ => {
                return Err(
                    DecodeError::malformed(CHALLENGE_REQUEST_TYPE, "challenge carries no uuid").into(),
                );
            }
        };
        debug!("Challenge received for uuid {}", uuid);

        if matches!(
            self.connection_state(),
            ConnectionState::Open | ConnectionState::Ready
        ) {
            self.transition(ConnectionState::Authenticating);
        }

        if let Some(cached) = self.store.get() {
            info!("Answering challenge with cached session for {}", cached.wallet.short());
            if self.state.wallet.get().is_none() {
                self.state.wallet.set(Some(cached.wallet.clone()));
            }
            return self.send_ack(&cached).await;
        }

        let wallet = self.request_wallet().await?;
        let challenge = AuthChallenge::new(wallet, uuid, generate_nonce());

        let sign = self
            .signer
            .sign(&challenge.challenge_text(), challenge.wallet())
            .await?;

        let record = SessionRecordBuilder::default()
            .with_challenge(&challenge)
            .with_signature(sign)
            .build()?;

        self.send_ack(&record).await?;

        if let Err(e) = self.store.set(&record) {
            warn!("Signed session sent but not cached: {}", e);
        }
        Ok(())
    }

    async fn send_ack(&self, record: &SessionRecord) -> Result<(), CoreError> {
        let frame = self.codec.encode(AUTH_ACK_TYPE, &ack_fields(record))?;
        self.send(frame).await?;
        info!("Sent signed ack for {}", record.wallet.short());
        Ok(())
    }
}
