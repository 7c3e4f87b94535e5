use crate::app_state::ApplicationState;
use crate::engine::{ConnectionState, MessageKind};
use crate::tests::engine::{
    CountingStore, Harness, MockSigner, challenge_frame, envelope_frame, profile_frame,
};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// **VALUE**: Verifies a profile update publishes energy and makes the session ready once.
///
/// **WHY THIS MATTERS**: The profile is the server's only confirmation that the ack was
/// accepted.
///
/// **BUG THIS CATCHES**: Would catch Ready being emitted for every profile update.
#[tokio::test]
async fn given_authenticating_when_profiles_arrive_then_energy_published_and_ready_once() {
    // GIVEN: A ready counter registered before the connection
    let state = ApplicationState::new();
    let ready = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ready);
    state.on_ready(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut h = Harness::connected(CountingStore::default(), MockSigner::default(), state).await;
    h.push(crate::transport::TransportEvent::Open).await;
    h.push_frame(challenge_frame("abc")).await;

    // WHEN: Two profile updates
    h.push_frame(profile_frame(42)).await;
    h.settle().await;
    let energy_after_first = h.engine.state().energy.get();
    h.push_frame(profile_frame(17)).await;
    h.settle().await;

    // THEN
    assert_eq!(energy_after_first, 42);
    assert_eq!(h.engine.state().energy.get(), 17);
    assert_eq!(h.state(), ConnectionState::Ready);
    assert_eq!(ready.load(Ordering::SeqCst), 1, "exactly one Ready transition");
}

/// **VALUE**: Verifies a profile received before any challenge also makes the session ready.
///
/// **WHY THIS MATTERS**: A server that trusts the connection may skip the challenge.
///
/// **BUG THIS CATCHES**: Would catch Ready only being reachable from Authenticating.
#[tokio::test]
async fn given_open_when_profile_arrives_then_ready() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;

    h.push_frame(profile_frame(5)).await;
    h.settle().await;

    assert_eq!(h.state(), ConnectionState::Ready);
    assert_eq!(h.engine.state().energy.get(), 5);
}

/// **VALUE**: Verifies an unknown tag changes nothing and sends nothing.
///
/// **WHY THIS MATTERS**: Newer servers may send message types this client does not know.
///
/// **BUG THIS CATCHES**: Would catch unknown frames changing state or producing replies.
#[tokio::test]
async fn given_unknown_tag_when_dispatched_then_no_state_change_and_no_send() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;
    let before = h.transitions();

    h.push_frame(envelope_frame(99)).await;
    h.settle().await;

    assert_eq!(h.transitions(), before);
    assert_eq!(h.state(), ConnectionState::Open);
    assert!(h.sent().is_empty());
}

/// **VALUE**: Verifies garbage frames are dropped without affecting the connection.
///
/// **WHY THIS MATTERS**: One corrupt frame must not end the session.
///
/// **BUG THIS CATCHES**: Would catch peek failures terminating the run loop.
#[tokio::test]
async fn given_malformed_frame_when_dispatched_then_dropped_and_loop_continues() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;

    h.push_frame(vec![0xff, 0xff, 0xff]).await;
    h.push_frame(profile_frame(3)).await;
    h.settle().await;

    assert_eq!(h.state(), ConnectionState::Ready, "later frames still handled");
    assert!(h.sent().is_empty());
}

/// **VALUE**: Verifies a challenge while ready moves back to authenticating.
///
/// **WHY THIS MATTERS**: The server may re-challenge a live session.
///
/// **BUG THIS CATCHES**: Would catch challenges being ignored once ready.
#[tokio::test]
async fn given_ready_when_challenged_then_authenticating_again() {
    let mut h = Harness::open(CountingStore::default(), MockSigner::default()).await;
    h.push_frame(profile_frame(1)).await;
    h.settle().await;
    assert_eq!(h.state(), ConnectionState::Ready);

    h.push_frame(challenge_frame("again")).await;
    h.settle().await;

    assert_eq!(h.state(), ConnectionState::Authenticating);
    assert_eq!(h.sent_acks().len(), 1);
}

/// **VALUE**: Verifies tag mapping for every kind, including unknown tags.
///
/// **WHY THIS MATTERS**: The table is the single source of truth for dispatch.
///
/// **BUG THIS CATCHES**: Would catch a swapped tag or a lossy unknown arm.
#[test]
fn given_tags_when_mapping_to_kinds_then_each_lands_on_its_arm() {
    let cases = [
        (1, MessageKind::ChallengeRequest),
        (2, MessageKind::AuthAck),
        (3, MessageKind::ProfileUpdate),
        (0, MessageKind::Unknown(0)),
        (99, MessageKind::Unknown(99)),
        (-1, MessageKind::Unknown(-1)),
    ];

    for (tag, kind) in cases {
        assert_eq!(MessageKind::from_tag(tag), kind, "tag {tag}");
    }
}
