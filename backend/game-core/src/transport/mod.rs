//! Duplex, message-oriented connection to the game server.
//!
//! A [`TransportHandle`] is two channels: commands flow out to whatever owns the
//! socket, events flow back in. The socket owner is a background task for
//! [`WebSocketConnector`]; tests drive the other ends of the channels directly
//! through [`TransportHandle::from_channels`].
//!
//! # Ordering
//!
//! Events are delivered in arrival order through a bounded channel. When the
//! consumer falls behind, the socket reader waits rather than dropping frames.

mod websocket;

pub use websocket::{DEFAULT_CHANNEL_CAPACITY, WebSocketConnector};
pub(crate) use websocket::spawn_socket_tasks;

use crate::error::transport::TransportError;

use std::future::Future;

use log::debug;
use tokio::sync::mpsc;
use url::Url;

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established and frames may be sent.
    Open,
    /// One inbound binary frame.
    Message(Vec<u8>),
    /// The connection is gone. No further events follow.
    Closed,
    /// The connection failed. `Closed` is expected to follow.
    Error(String),
}

/// Instructions for the socket owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Write one binary frame.
    Send(Vec<u8>),
    /// Start a close handshake.
    Close,
}

/// The engine's end of a connection.
#[derive(Debug)]
pub struct TransportHandle {
    commands: mpsc::Sender<TransportCommand>,
    events: mpsc::Receiver<TransportEvent>,
}

impl TransportHandle {
    /// Build a handle over existing channels.
    ///
    /// The caller keeps the command receiver and the event sender and plays the
    /// part of the socket.
    pub fn from_channels(
        commands: mpsc::Sender<TransportCommand>,
        events: mpsc::Receiver<TransportEvent>,
    ) -> Self {
        Self { commands, events }
    }

    /// Queue one binary frame for sending.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] if the socket owner has gone away.
    pub async fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        debug!("Queueing {} byte frame", frame.len());
        self.commands
            .send(TransportCommand::Send(frame))
            .await
            .map_err(|_| TransportError::closed())
    }

    /// Ask the socket owner to close the connection. A no-op if it already has.
    pub async fn close(&self) {
        if self.commands.send(TransportCommand::Close).await.is_err() {
            debug!("Close requested on a transport that is already gone");
        }
    }

    /// Wait for the next event. `None` once the socket owner has dropped its sender.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

/// Opens transports.
pub trait Connector: Send + Sync {
    /// Establish a connection to `url`.
    ///
    /// On success the first event yielded by the handle is [`TransportEvent::Open`].
    fn connect(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<TransportHandle, TransportError>> + Send;
}
