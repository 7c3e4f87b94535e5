use crate::app_state::ApplicationState;
use crate::codec::MessageCodec;
use crate::engine::{ConnectionState, ProtocolEngine};
use crate::error::engine::EngineError;
use crate::session_store::MemorySessionStore;
use crate::tests::engine::{
    ChannelConnector, CountingStore, Harness, MockSigner, challenge_frame, profile_frame,
    server_url,
};
use crate::transport::{TransportCommand, TransportEvent};

use ConnectionState::{Authenticating, Closed, Connecting, Error, Idle, Open, Ready};

fn idle_engine() -> ProtocolEngine<MemorySessionStore, MockSigner> {
    ProtocolEngine::new(
        MessageCodec::with_default_schema().unwrap(),
        MemorySessionStore::new(),
        MockSigner::default(),
    )
}

/// **VALUE**: Verifies the full happy path publishes every state in order, once each.
///
/// **WHY THIS MATTERS**: Display code reacts to each transition.
///
/// **BUG THIS CATCHES**: Would catch skipped states or duplicate notifications.
#[tokio::test]
async fn given_full_session_when_run_to_close_then_states_in_order() {
    // GIVEN
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;

    // WHEN
    h.push_frame(challenge_frame("abc")).await;
    h.push_frame(profile_frame(42)).await;
    h.close().await;

    // THEN
    assert_eq!(
        h.transitions(),
        vec![Idle, Connecting, Open, Authenticating, Ready, Closed]
    );
}

/// **VALUE**: Verifies a second connect on the same engine is refused.
///
/// **WHY THIS MATTERS**: One engine drives at most one connection.
///
/// **BUG THIS CATCHES**: Would catch a reconnect silently replacing the live transport.
#[tokio::test]
async fn given_connected_engine_when_connecting_again_then_invalid_state() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;
    h.settle().await;

    let result = h
        .engine
        .connect(&ChannelConnector::refusing(), &server_url())
        .await;

    match result {
        Err(EngineError::InvalidState { operation, state, .. }) => {
            assert_eq!(operation, "connect");
            assert_eq!(state, Open);
        }
        other => panic!("expected InvalidState, got {other:?}"),
    }
}

/// **VALUE**: Verifies a failed connect passes through Error to Closed and reports the cause.
///
/// **WHY THIS MATTERS**: There is no automatic retry; the caller decides what to do.
///
/// **BUG THIS CATCHES**: Would catch the engine staying in Connecting after a failure.
#[tokio::test]
async fn given_refusing_connector_when_connecting_then_error_then_closed() {
    // GIVEN
    let mut engine = idle_engine();
    let states = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&states);
    engine
        .state()
        .connection
        .subscribe(move |s| sink.lock().unwrap().push(*s));

    // WHEN
    let result = engine.connect(&ChannelConnector::refusing(), &server_url()).await;

    // THEN
    assert!(matches!(result, Err(EngineError::Transport(_))));
    assert_eq!(*states.lock().unwrap(), vec![Idle, Connecting, Error, Closed]);
}

/// **VALUE**: Verifies run without a connection is refused.
///
/// **WHY THIS MATTERS**: Calling run before connect is a programming error worth surfacing.
///
/// **BUG THIS CATCHES**: Would catch run hanging forever on a missing transport.
#[tokio::test]
async fn given_idle_engine_when_running_then_invalid_state() {
    let mut engine = idle_engine();

    let result = engine.run().await;

    assert!(matches!(
        result,
        Err(EngineError::InvalidState { operation: "run", state: Idle, .. })
    ));
}

/// **VALUE**: Verifies a transport error moves to Error and the following close to Closed.
///
/// **WHY THIS MATTERS**: Observers need to tell a failure apart from a clean close.
///
/// **BUG THIS CATCHES**: Would catch errors being swallowed or ending the loop early.
#[tokio::test]
async fn given_transport_error_when_running_then_error_then_closed() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;

    h.push(TransportEvent::Error("connection reset".to_string())).await;
    h.settle().await;
    assert_eq!(h.state(), Error);

    h.close().await;
    assert_eq!(h.state(), Closed);
}

/// **VALUE**: Verifies the engine closes when the event stream ends without a close event.
///
/// **WHY THIS MATTERS**: A crashed socket task must not leave the engine waiting forever.
///
/// **BUG THIS CATCHES**: Would catch `run` looping on a finished stream.
#[tokio::test]
async fn given_event_stream_ends_when_running_then_closed() {
    let Harness {
        mut engine, events, ..
    } = Harness::open(CountingStore::default(), MockSigner::default()).await;

    drop(events);
    engine.run().await.unwrap();

    assert_eq!(engine.connection_state(), Closed);
}

/// **VALUE**: Verifies Closed is terminal: run refuses to restart and connect is refused.
///
/// **WHY THIS MATTERS**: There is no reconnection; a new session needs a new engine.
///
/// **BUG THIS CATCHES**: Would catch a closed engine accepting more work.
#[tokio::test]
async fn given_closed_engine_when_running_or_connecting_then_invalid_state() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;
    h.close().await;

    let run = h.engine.run().await;
    let connect = h
        .engine
        .connect(&ChannelConnector::refusing(), &server_url())
        .await;

    assert!(matches!(run, Err(EngineError::InvalidState { state: Closed, .. })));
    assert!(matches!(connect, Err(EngineError::InvalidState { state: Closed, .. })));
}

/// **VALUE**: Verifies `close` asks the transport to close.
///
/// **WHY THIS MATTERS**: This is how the binary shuts the session down on Ctrl-C.
///
/// **BUG THIS CATCHES**: Would catch close being a no-op.
#[tokio::test]
async fn given_open_engine_when_closing_then_close_command_sent() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;

    h.engine.close().await;

    assert_eq!(h.sent(), vec![TransportCommand::Close]);
}

/// **VALUE**: Verifies frames that arrive before the open event are dropped.
///
/// **WHY THIS MATTERS**: Handlers assume a usable connection.
///
/// **BUG THIS CATCHES**: Would catch dispatch running while still connecting.
#[tokio::test]
async fn given_connecting_when_frame_arrives_then_dropped() {
    let mut h =
        Harness::connected(CountingStore::default(), MockSigner::default(), ApplicationState::new())
            .await;

    h.push_frame(profile_frame(9)).await;
    h.settle().await;

    assert_eq!(h.state(), Connecting);
    assert_eq!(h.engine.state().energy.get(), 0);
}
