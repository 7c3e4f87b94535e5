use crate::codec::PROFILE_TYPE;
use crate::engine::{ConnectionState, ProtocolEngine};
use crate::error::CoreError;
use crate::session_store::SessionStore;
use crate::signer::Signer;

use log::{debug, info, warn};

const ENERGIES_FIELD: &str = "energies";

/// Inbound message kinds, keyed by the envelope discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Server asks the client to prove wallet ownership (`UUIDValidation`).
    ChallengeRequest,
    /// The client's signed answer (`ClientAuth`). Never sent by the server.
    AuthAck,
    /// Player profile (`Profile`); doubles as the server's acceptance of the ack.
    ProfileUpdate,
    Unknown(i32),
}

impl MessageKind {
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            1 => MessageKind::ChallengeRequest,
            2 => MessageKind::AuthAck,
            3 => MessageKind::ProfileUpdate,
            other => MessageKind::Unknown(other),
        }
    }
}

impl<S: SessionStore, G: Signer> ProtocolEngine<S, G> {
    /// Route one inbound frame to its handler.
    ///
    /// Handler failures are logged here and go no further; a bad frame never ends
    /// the connection.
    pub(crate) async fn dispatch(&mut self, frame: &[u8]) {
        let Some(tag) = self.codec.peek_type(frame) else {
            warn!("Dropping malformed {} byte frame", frame.len());
            return;
        };

        let kind = MessageKind::from_tag(tag);
        let result = match kind {
            MessageKind::ChallengeRequest => self.handle_challenge(frame).await,
            MessageKind::ProfileUpdate => self.handle_profile(frame),
            MessageKind::AuthAck | MessageKind::Unknown(_) => {
                debug!("Dropping frame with unhandled type {}", tag);
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Failed to handle {:?} frame: {}", kind, e);
        }
    }

    fn handle_profile(&mut self, frame: &[u8]) -> Result<(), CoreError> {
        let profile = self.codec.decode(PROFILE_TYPE, frame)?;
        let energies = profile.get_i64(ENERGIES_FIELD).unwrap_or_default();

        debug!("Profile update: energies={}", energies);
        self.state.energy.set(energies);

        if matches!(
            self.connection_state(),
            ConnectionState::Open | ConnectionState::Authenticating
        ) {
            info!("Session ready");
            self.transition(ConnectionState::Ready);
        }
        Ok(())
    }
}
