//! Test helpers for end-to-end tests against an in-process game server.
//!
//! The server side is written with the generated `server` types, independently of
//! the runtime codec, so these tests prove the two agree on the wire.

use game_core::error::signer::SignerError;
use game_core::proto::server::{ClientAuth, Profile, UuidValidation};
use game_core::signer::Signer;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::{SinkExt, StreamExt};
use models::{Address, Signature};
use prost::Message as ProstMessage;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use url::Url;

pub const TEST_WALLET: &str = "0x00000000000000000000000000000000000000aa";
pub const TEST_SIGNATURE: &str = "0xfeedface";

pub type ServerSocket = WebSocketStream<TcpStream>;

/// Signer that always approves and counts its prompts.
#[derive(Default)]
pub struct ApprovingSigner {
    pub prompts: AtomicUsize,
}

impl ApprovingSigner {
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Signer for ApprovingSigner {
    async fn request_address(&self) -> Result<Address, SignerError> {
        Address::parse(TEST_WALLET).map_err(|e| SignerError::unavailable(e.to_string()))
    }

    async fn sign(&self, challenge_text: &str, _address: &Address) -> Result<Signature, SignerError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        assert!(challenge_text.starts_with(TEST_WALLET));
        Signature::new(TEST_SIGNATURE).map_err(|e| SignerError::unavailable(e.to_string()))
    }
}

/// Bind a listener on an ephemeral localhost port.
pub async fn bind() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    let url = Url::parse(&format!("ws://{addr}")).expect("valid url");
    (listener, url)
}

/// Accept one WebSocket client.
pub async fn accept(listener: &TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.expect("Failed to accept");
    accept_async(stream).await.expect("WebSocket handshake failed")
}

pub async fn send_protobuf<T: ProstMessage>(ws: &mut ServerSocket, message: &T) {
    ws.send(Message::Binary(message.encode_to_vec().into()))
        .await
        .expect("Failed to send message");
}

/// Next binary frame, decoded. Skips control frames.
pub async fn receive_protobuf<T: ProstMessage + Default>(ws: &mut ServerSocket) -> T {
    loop {
        let msg = ws
            .next()
            .await
            .expect("No message received")
            .expect("Error receiving message");

        if let Message::Binary(bytes) = msg {
            return T::decode(&bytes[..]).expect("Failed to decode protobuf");
        }
    }
}

pub async fn send_challenge(ws: &mut ServerSocket, uuid: &str) {
    let challenge = UuidValidation {
        r#type: 1,
        uuid: uuid.to_string(),
    };
    send_protobuf(ws, &challenge).await;
}

pub async fn send_profile(ws: &mut ServerSocket, energies: i32) {
    send_protobuf(ws, &Profile { r#type: 3, energies }).await;
}

/// One challenge, one ack, one profile, then close. Returns the ack.
pub async fn serve_handshake(listener: TcpListener, uuid: &str, energies: i32) -> ClientAuth {
    let mut ws = accept(&listener).await;

    send_challenge(&mut ws, uuid).await;
    let ack: ClientAuth = receive_protobuf(&mut ws).await;
    send_profile(&mut ws, energies).await;

    let _ = ws.close(None).await;
    ack
}
