//! The protocol engine: one connection, one sequential dispatch flow.
//!
//! [`ProtocolEngine`] owns the codec, the session store, the signer and the
//! application state cells. [`connect`](ProtocolEngine::connect) opens the
//! transport; [`run`](ProtocolEngine::run) then consumes transport events until
//! the connection closes, fully handling each frame before reading the next.

mod connection_state;
mod dispatch;
mod handshake;

pub use connection_state::ConnectionState;
pub use dispatch::MessageKind;
pub use handshake::{NONCE_UPPER_BOUND, ack_fields, generate_nonce};

use crate::app_state::ApplicationState;
use crate::codec::MessageCodec;
use crate::error::engine::EngineError;
use crate::error::signer::SignerError;
use crate::error::store::StoreError;
use crate::error::transport::TransportError;
use crate::session_store::SessionStore;
use crate::signer::Signer;
use crate::transport::{Connector, TransportEvent, TransportHandle};

use common::ErrorLocation;

use std::panic::Location;

use log::{debug, error, info, warn};
use models::Address;
use url::Url;

pub struct ProtocolEngine<S: SessionStore, G: Signer> {
    codec: MessageCodec,
    store: S,
    signer: G,
    state: ApplicationState,
    transport: Option<TransportHandle>,
}

impl<S: SessionStore, G: Signer> ProtocolEngine<S, G> {
    pub fn new(codec: MessageCodec, store: S, signer: G) -> Self {
        Self::with_state(codec, store, signer, ApplicationState::default())
    }

    /// Engine publishing into existing cells, e.g. ones display code already observes.
    pub fn with_state(codec: MessageCodec, store: S, signer: G, state: ApplicationState) -> Self {
        Self {
            codec,
            store,
            signer,
            state,
            transport: None,
        }
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.connection.get()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open the connection.
    ///
    /// Only valid from [`ConnectionState::Idle`]; an engine drives one connection
    /// in its lifetime. On failure the state passes through `Error` to `Closed`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidState`] if not idle
    /// - [`EngineError::Transport`] if the connection could not be established
    pub async fn connect<C: Connector>(
        &mut self,
        connector: &C,
        url: &Url,
    ) -> Result<(), EngineError> {
        let state = self.connection_state();
        if state != ConnectionState::Idle {
            return Err(EngineError::InvalidState {
                operation: "connect",
                state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.transition(ConnectionState::Connecting);

        match connector.connect(url).await {
            Ok(handle) => {
                self.transport = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!("Connection to {} failed: {}", url, e);
                self.transition(ConnectionState::Error);
                self.transition(ConnectionState::Closed);
                Err(EngineError::Transport(e))
            }
        }
    }

    /// Consume transport events until the connection closes.
    ///
    /// Returns once the state is `Closed`. Dropping the future stops the engine
    /// without closing the socket; use [`close`](Self::close) for that.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] if there is no open connection to run.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        let state = self.connection_state();
        if self.transport.is_none() || state.is_terminal() {
            return Err(EngineError::InvalidState {
                operation: "run",
                state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        loop {
            let event = match self.transport.as_mut() {
                Some(transport) => transport.next_event().await,
                None => None,
            };

            let Some(event) = event else {
                warn!("Transport event stream ended without a close");
                self.transition(ConnectionState::Closed);
                return Ok(());
            };

            match event {
                TransportEvent::Open => {
                    if self.connection_state() == ConnectionState::Connecting {
                        info!("Connection open");
                        self.transition(ConnectionState::Open);
                    }
                }
                TransportEvent::Message(frame) => {
                    let state = self.connection_state();
                    if state.accepts_frames() {
                        self.dispatch(&frame).await;
                    } else {
                        debug!("Dropping frame received while {}", state);
                    }
                }
                TransportEvent::Error(reason) => {
                    error!("Transport error: {}", reason);
                    self.transition(ConnectionState::Error);
                }
                TransportEvent::Closed => {
                    info!("Connection closed");
                    self.transition(ConnectionState::Closed);
                    return Ok(());
                }
            }
        }
    }

    /// Ask the transport to close. `run` returns once the close completes.
    pub async fn close(&self) {
        if let Some(transport) = &self.transport {
            transport.close().await;
        }
    }

    /// The wallet address, asking the signer if none is known yet.
    ///
    /// A newly obtained address is published to the wallet cell.
    ///
    /// # Errors
    ///
    /// Returns the signer's error if it cannot or will not provide an address.
    pub async fn request_wallet(&self) -> Result<Address, SignerError> {
        if let Some(wallet) = self.state.wallet.get() {
            return Ok(wallet);
        }

        let wallet = self.signer.request_address().await?;
        info!("Wallet connected: {}", wallet.short());
        self.state.wallet.set(Some(wallet.clone()));
        Ok(wallet)
    }

    /// Drop the cached session so the next challenge prompts the wallet again.
    pub fn forget_session(&self) -> Result<(), StoreError> {
        self.store.clear()?;
        info!("Cached session cleared");
        Ok(())
    }

    pub(crate) async fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        match &self.transport {
            Some(transport) => transport.send(frame).await,
            None => Err(TransportError::closed()),
        }
    }

    /// Move to `next`, notifying observers only on an actual change.
    pub(crate) fn transition(&self, next: ConnectionState) {
        let current = self.connection_state();
        if current == next || current.is_terminal() {
            return;
        }

        debug!("Connection state {} -> {}", current, next);
        self.state.connection.set(next);
    }
}
