mod dispatch;
mod lifecycle;

use crate::app_state::ApplicationState;
use crate::codec::MessageCodec;
use crate::engine::{ConnectionState, ProtocolEngine};
use crate::error::signer::SignerError;
use crate::error::store::StoreError;
use crate::error::transport::TransportError;
use crate::proto::server::{ClientAuth, MessageType, Profile, UuidValidation};
use crate::session_store::{MemorySessionStore, SessionStore};
use crate::signer::Signer;
use crate::tests::test_wallet;
use crate::transport::{Connector, TransportCommand, TransportEvent, TransportHandle};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use models::{Address, SessionRecord, Signature};
use prost::Message as ProstMessage;
use tokio::sync::{Notify, mpsc};
use url::Url;

const CHANNEL_CAPACITY: usize = 32;
const IDLE_WAIT: Duration = Duration::from_millis(200);

pub(super) const TEST_SIGNATURE: &str = "0xsigned";

/// Signer double recording every request.
#[derive(Default)]
pub(super) struct MockSigner {
    sign_calls: Mutex<Vec<String>>,
    address_calls: AtomicUsize,
    rejections_left: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockSigner {
    /// Reject the next `count` sign requests.
    pub(super) fn rejecting(count: usize) -> Self {
        Self {
            rejections_left: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    /// Hold every sign request until `gate` is notified.
    pub(super) fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub(super) fn sign_calls(&self) -> Vec<String> {
        self.sign_calls.lock().unwrap().clone()
    }

    pub(super) fn address_calls(&self) -> usize {
        self.address_calls.load(Ordering::SeqCst)
    }
}

impl Signer for MockSigner {
    async fn request_address(&self) -> Result<Address, SignerError> {
        self.address_calls.fetch_add(1, Ordering::SeqCst);
        Ok(test_wallet())
    }

    async fn sign(&self, challenge_text: &str, _address: &Address) -> Result<Signature, SignerError> {
        self.sign_calls.lock().unwrap().push(challenge_text.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let rejected = self
            .rejections_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(SignerError::rejected("declined in test"));
        }

        Ok(Signature::new(TEST_SIGNATURE).unwrap())
    }
}

/// Memory store counting writes, optionally failing them.
#[derive(Default)]
pub(super) struct CountingStore {
    inner: MemorySessionStore,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl CountingStore {
    pub(super) fn with_record(record: SessionRecord) -> Self {
        Self {
            inner: MemorySessionStore::with_record(record),
            ..Self::default()
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            fail_writes: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub(super) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SessionStore for CountingStore {
    fn get(&self) -> Option<SessionRecord> {
        self.inner.get()
    }

    fn set(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Slot {
                message: "disk full".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.inner.set(record)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear()
    }
}

/// Connector handing out one pre-built in-memory transport.
pub(super) struct ChannelConnector {
    handle: Mutex<Option<TransportHandle>>,
}

impl ChannelConnector {
    pub(super) fn new(handle: TransportHandle) -> Self {
        Self {
            handle: Mutex::new(Some(handle)),
        }
    }

    pub(super) fn refusing() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }
}

impl Connector for ChannelConnector {
    async fn connect(&self, _url: &Url) -> Result<TransportHandle, TransportError> {
        let handle = self.handle.lock().unwrap().take();
        handle.ok_or_else(|| TransportError::Connect {
            message: "connection refused".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

pub(super) fn server_url() -> Url {
    Url::parse("ws://localhost:8999").unwrap()
}

/// An engine wired to in-memory channels, plus the server's ends of those channels.
pub(super) struct Harness {
    pub(super) engine: ProtocolEngine<Arc<CountingStore>, Arc<MockSigner>>,
    pub(super) store: Arc<CountingStore>,
    pub(super) signer: Arc<MockSigner>,
    events: mpsc::Sender<TransportEvent>,
    commands: mpsc::Receiver<TransportCommand>,
    transitions: Arc<Mutex<Vec<ConnectionState>>>,
}

impl Harness {
    /// Connected engine that has already seen the transport open.
    pub(super) async fn open(store: CountingStore, signer: MockSigner) -> Self {
        let mut harness = Self::connected(store, signer, ApplicationState::new()).await;
        harness.push(TransportEvent::Open).await;
        harness
    }

    pub(super) async fn connected(store: CountingStore, signer: MockSigner, state: ApplicationState) -> Self {
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let connector = ChannelConnector::new(TransportHandle::from_channels(command_tx, event_rx));

        let store = Arc::new(store);
        let signer = Arc::new(signer);
        let codec = MessageCodec::with_default_schema().unwrap();

        let transitions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&transitions);
        state
            .connection
            .subscribe(move |s: &ConnectionState| sink.lock().unwrap().push(*s));

        let mut engine =
            ProtocolEngine::with_state(codec, Arc::clone(&store), Arc::clone(&signer), state);
        engine.connect(&connector, &server_url()).await.unwrap();

        Self {
            engine,
            store,
            signer,
            events: event_tx,
            commands: command_rx,
            transitions,
        }
    }

    pub(super) async fn push(&mut self, event: TransportEvent) {
        self.events.send(event).await.unwrap();
    }

    pub(super) async fn push_frame(&mut self, frame: Vec<u8>) {
        self.push(TransportEvent::Message(frame)).await;
    }

    /// Let the engine process everything queued so far, leaving the connection up.
    pub(super) async fn settle(&mut self) {
        let result = tokio::time::timeout(IDLE_WAIT, self.engine.run()).await;
        assert!(result.is_err(), "run returned early: {result:?}");
    }

    /// Close from the server side and wait for `run` to return.
    pub(super) async fn close(&mut self) {
        self.push(TransportEvent::Closed).await;
        self.engine.run().await.unwrap();
    }

    pub(super) fn state(&self) -> ConnectionState {
        self.engine.connection_state()
    }

    /// Every state the engine has published, starting with the initial one.
    pub(super) fn transitions(&self) -> Vec<ConnectionState> {
        self.transitions.lock().unwrap().clone()
    }

    /// Outbound commands issued since the last call.
    pub(super) fn sent(&mut self) -> Vec<TransportCommand> {
        let mut sent = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            sent.push(command);
        }
        sent
    }

    /// Outbound frames since the last call, decoded as `ClientAuth`.
    pub(super) fn sent_acks(&mut self) -> Vec<ClientAuth> {
        self.sent()
            .into_iter()
            .map(|command| match command {
                TransportCommand::Send(frame) => ClientAuth::decode(frame.as_slice()).unwrap(),
                TransportCommand::Close => panic!("unexpected close command"),
            })
            .collect()
    }
}

pub(super) fn challenge_frame(uuid: &str) -> Vec<u8> {
    UuidValidation {
        r#type: 1,
        uuid: uuid.to_string(),
    }
    .encode_to_vec()
}

pub(super) fn profile_frame(energies: i32) -> Vec<u8> {
    Profile { r#type: 3, energies }.encode_to_vec()
}

pub(super) fn envelope_frame(tag: i32) -> Vec<u8> {
    MessageType { r#type: tag }.encode_to_vec()
}
