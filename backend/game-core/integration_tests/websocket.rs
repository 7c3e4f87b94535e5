use crate::helpers::{
    ApprovingSigner, TEST_SIGNATURE, TEST_WALLET, accept, bind, receive_protobuf, send_challenge,
    send_profile, send_protobuf, serve_handshake,
};

use game_core::codec::MessageCodec;
use game_core::engine::{ConnectionState, ProtocolEngine};
use game_core::error::engine::EngineError;
use game_core::proto::server::{ClientAuth, MessageType};
use game_core::session_store::{FileSessionStore, SessionStore};
use game_core::transport::WebSocketConnector;

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn engine(
    store: FileSessionStore,
    signer: Arc<ApprovingSigner>,
) -> ProtocolEngine<FileSessionStore, Arc<ApprovingSigner>> {
    let codec = MessageCodec::with_default_schema().expect("built-in schema");
    ProtocolEngine::new(codec, store, signer)
}

/// **VALUE**: Verifies a complete handshake against a real WebSocket server.
///
/// **WHY THIS MATTERS**: This is the whole client: connect, answer the challenge with a signed
/// ack the server can decode, accept the profile, and shut down when the server closes.
///
/// **BUG THIS CATCHES**: Would catch wire incompatibility with the generated server types,
/// frames lost in the socket tasks, or `run` not returning on close.
#[tokio::test]
async fn given_game_server_when_running_session_then_handshake_completes_and_profile_applied() {
    // GIVEN: A server that challenges, reads the ack, sends a profile and closes
    let (listener, url) = bind().await;
    let session_id = Uuid::new_v4().to_string();
    let server_session_id = session_id.clone();
    let server =
        tokio::spawn(async move { serve_handshake(listener, &server_session_id, 42).await });

    let dir = tempfile::tempdir().expect("temp dir");
    let signer = Arc::new(ApprovingSigner::default());
    let mut engine = engine(FileSessionStore::new(dir.path()), Arc::clone(&signer));

    // WHEN
    engine
        .connect(&WebSocketConnector::new(), &url)
        .await
        .expect("connects");
    timeout(TEST_TIMEOUT, engine.run())
        .await
        .expect("run returns after server close")
        .expect("run succeeds");

    // THEN: The server got a correctly signed ack
    let ack = server.await.expect("server task");
    assert_eq!(ack.r#type, 2);
    assert_eq!(ack.wallet, TEST_WALLET);
    assert_eq!(ack.uuid, session_id);
    assert_eq!(ack.sign, TEST_SIGNATURE);
    assert!(u32::from_str_radix(&ack.nonce, 16).is_ok());

    // THEN: Client state reflects the session
    assert_eq!(signer.prompts(), 1);
    assert_eq!(engine.state().energy.get(), 42);
    assert_eq!(engine.connection_state(), ConnectionState::Closed);

    let cached = engine.store().get().expect("session cached");
    assert_eq!(cached.nonce, ack.nonce);
}

/// **VALUE**: Verifies a second process run reuses the session file without prompting.
///
/// **WHY THIS MATTERS**: Returning players reconnect without a wallet prompt.
///
/// **BUG THIS CATCHES**: Would catch the file store not surviving between engines, or the
/// cached ack differing from the signed one.
#[tokio::test]
async fn given_cached_session_file_when_reconnecting_then_same_ack_without_prompt() {
    let dir = tempfile::tempdir().expect("temp dir");

    // GIVEN: A first session that signed and cached
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move { serve_handshake(listener, "first", 1).await });
    let first_signer = Arc::new(ApprovingSigner::default());
    let mut first = engine(FileSessionStore::new(dir.path()), Arc::clone(&first_signer));
    first.connect(&WebSocketConnector::new(), &url).await.expect("connects");
    timeout(TEST_TIMEOUT, first.run()).await.expect("first run").expect("ok");
    let first_ack = server.await.expect("server task");

    // WHEN: A fresh engine on the same directory connects again
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move { serve_handshake(listener, "second", 2).await });
    let second_signer = Arc::new(ApprovingSigner::default());
    let mut second = engine(FileSessionStore::new(dir.path()), Arc::clone(&second_signer));
    second.connect(&WebSocketConnector::new(), &url).await.expect("connects");
    timeout(TEST_TIMEOUT, second.run()).await.expect("second run").expect("ok");
    let second_ack: ClientAuth = server.await.expect("server task");

    // THEN
    assert_eq!(second_signer.prompts(), 0);
    assert_eq!(second_ack, first_ack);
    assert_eq!(second.state().energy.get(), 2);
}

/// **VALUE**: Verifies text frames and unknown message types do not disturb the session.
///
/// **WHY THIS MATTERS**: Debug tooling or newer servers may send frames this client ignores.
///
/// **BUG THIS CATCHES**: Would catch a text frame closing the transport.
#[tokio::test]
async fn given_text_and_unknown_frames_when_running_then_ignored() {
    // GIVEN
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::Text("hello".into())).await.expect("send text");
        send_protobuf(&mut ws, &MessageType { r#type: 99 }).await;
        send_challenge(&mut ws, "abc").await;
        let _ack: ClientAuth = receive_protobuf(&mut ws).await;
        send_profile(&mut ws, 7).await;
        let _ = ws.close(None).await;
    });

    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(
        FileSessionStore::new(dir.path()),
        Arc::new(ApprovingSigner::default()),
    );

    // WHEN
    engine.connect(&WebSocketConnector::new(), &url).await.expect("connects");
    timeout(TEST_TIMEOUT, engine.run()).await.expect("run returns").expect("ok");
    server.await.expect("server task");

    // THEN
    assert_eq!(engine.state().energy.get(), 7);
}

/// **VALUE**: Verifies connecting to a port with no server fails cleanly.
///
/// **WHY THIS MATTERS**: The binary must report an unreachable server, not hang or panic.
///
/// **BUG THIS CATCHES**: Would catch connect errors not reaching the caller.
#[tokio::test]
async fn given_no_server_when_connecting_then_transport_error_and_closed() {
    // GIVEN: A port that was bound and released
    let (listener, url) = bind().await;
    drop(listener);

    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(
        FileSessionStore::new(dir.path()),
        Arc::new(ApprovingSigner::default()),
    );

    // WHEN
    let result = engine.connect(&WebSocketConnector::new(), &url).await;

    // THEN
    assert!(matches!(result, Err(EngineError::Transport(_))));
    assert_eq!(engine.connection_state(), ConnectionState::Closed);
}

/// **VALUE**: Verifies a client-initiated close ends `run`.
///
/// **WHY THIS MATTERS**: Ctrl-C in the binary closes the session this way.
///
/// **BUG THIS CATCHES**: Would catch the close command not reaching the socket.
#[tokio::test]
async fn given_open_session_when_client_closes_then_run_returns() {
    // GIVEN: A server that echoes the close handshake and otherwise stays silent
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move {
        use futures_util::StreamExt;
        let mut ws = accept(&listener).await;
        // Reading past the close frame flushes the close reply.
        while let Some(Ok(_)) = ws.next().await {}
    });

    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(
        FileSessionStore::new(dir.path()),
        Arc::new(ApprovingSigner::default()),
    );
    engine.connect(&WebSocketConnector::new(), &url).await.expect("connects");

    // WHEN
    engine.close().await;
    timeout(TEST_TIMEOUT, engine.run()).await.expect("run returns").expect("ok");

    // THEN
    assert_eq!(engine.connection_state(), ConnectionState::Closed);
    timeout(TEST_TIMEOUT, server).await.expect("server done").expect("server task");
}

