use crate::error::transport::TransportError;
use crate::transport::{Connector, TransportCommand, TransportEvent, TransportHandle};

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use log::{debug, error, info, warn};
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use url::Url;

/// Frames buffered between the socket tasks and the engine.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Binary-frame WebSocket transport.
///
/// Each connection runs two background tasks: a reader forwarding inbound frames
/// as events, and a writer draining commands onto the socket. Text frames are
/// not part of the protocol and are dropped.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    capacity: usize,
}

impl WebSocketConnector {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for WebSocketConnector {
    async fn connect(&self, url: &Url) -> Result<TransportHandle, TransportError> {
        info!("Connecting to {}", url);

        let (socket, _response) = connect_async(url.as_str()).await?;
        let (write, read) = socket.split();

        let handle = spawn_socket_tasks(write, read, self.capacity).await?;

        info!("Connected to {}", url);
        Ok(handle)
    }
}

/// Start the reader and writer tasks for one socket and hand back the engine's end.
///
/// The writer stops the reader when a write fails, so `Closed` follows the
/// write `Error` without waiting for the peer.
pub(crate) async fn spawn_socket_tasks<W, R>(
    write: W,
    read: R,
    capacity: usize,
) -> Result<TransportHandle, TransportError>
where
    W: Sink<Message, Error = WsError> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, WsError>> + Unpin + Send + 'static,
{
    let capacity = capacity.max(1);
    let (event_tx, event_rx) = mpsc::channel(capacity);
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (stop_tx, stop_rx) = mpsc::channel(1);

    // Capacity is at least one, so this never waits.
    event_tx
        .send(TransportEvent::Open)
        .await
        .map_err(|_| TransportError::closed())?;

    TokioSpawn(write_loop(write, command_rx, event_tx.clone(), stop_tx));
    TokioSpawn(read_loop(read, event_tx, stop_rx));

    Ok(TransportHandle::from_channels(command_tx, event_rx))
}

async fn read_loop<R>(
    mut read: R,
    events: mpsc::Sender<TransportEvent>,
    mut stop_rx: mpsc::Receiver<()>,
) where
    R: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            msg = read.next() => msg,
            // A writer that finishes normally drops its sender; only a failure stops us.
            Some(()) = stop_rx.recv() => {
                debug!("Writer failed, stopping reader");
                break;
            }
        };
        let Some(msg) = msg else {
            break;
        };

        let event = match msg {
            Ok(Message::Binary(data)) => TransportEvent::Message(data.to_vec()),
            Ok(Message::Text(text)) => {
                warn!("Ignoring {} byte text frame", text.len());
                continue;
            }
            Ok(Message::Close(frame)) => {
                info!("Server closed connection: {:?}", frame);
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                error!("WebSocket read failed: {}", e);
                if events.send(TransportEvent::Error(e.to_string())).await.is_err() {
                    return;
                }
                break;
            }
        };

        if events.send(event).await.is_err() {
            debug!("Event receiver dropped, stopping reader");
            return;
        }
    }

    let _ = events.send(TransportEvent::Closed).await;
}

async fn write_loop<W>(
    mut write: W,
    mut commands: mpsc::Receiver<TransportCommand>,
    events: mpsc::Sender<TransportEvent>,
    stop_tx: mpsc::Sender<()>,
) where
    W: Sink<Message, Error = WsError> + Unpin,
{
    while let Some(command) = commands.recv().await {
        let result = match command {
            TransportCommand::Send(frame) => write.send(Message::Binary(frame.into())).await,
            TransportCommand::Close => {
                debug!("Sending close frame");
                let result = write.send(Message::Close(None)).await;
                if result.is_ok() {
                    return;
                }
                result
            }
        };

        if let Err(e) = result {
            error!("WebSocket write failed: {}", e);
            let _ = events.send(TransportEvent::Error(e.to_string())).await;
            let _ = stop_tx.try_send(());
            return;
        }
    }

    // Handle dropped without an explicit close.
    let _ = write.close().await;
}
