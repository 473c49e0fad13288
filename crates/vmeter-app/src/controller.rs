//! Controller runtime - the single event loop driving a session
//!
//! [`TestController::run`] consumes messages one at a time from one mpsc
//! receiver: caller requests arrive through the [`ControllerHandle`], engine
//! events are forwarded in from the connection task. Each message passes
//! through the pure [`update`] function; resulting actions are executed
//! here, and an immutable snapshot is published after every transition.
//!
//! The controller exclusively owns the [`TestSession`] and the engine
//! connection handle. Observers hold a watch receiver of snapshots and a
//! notice receiver; neither can reach back into live state.

use tokio::sync::{mpsc, watch};

use vmeter_core::prelude::*;
use vmeter_core::{EngineEvent, TestDuration, TestSession, TestSnapshot};
use vmeter_engine::EngineConnection;

use crate::handler::{update, UpdateAction};
use crate::message::{Message, Notice};

/// Capacity of the message channel feeding the loop.
const MSG_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the engine event channel (data frames can be bursty).
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the notice channel. Notices are rare one-shots.
const NOTICE_CHANNEL_CAPACITY: usize = 8;

/// The session controller event loop.
///
/// Create with [`TestController::new`], spawn [`run`](Self::run) on the
/// runtime, and drive it through the returned [`ControllerHandle`].
pub struct TestController {
    session: TestSession,
    engine: Option<EngineConnection>,
    engine_url: String,
    msg_rx: mpsc::Receiver<Message>,
    msg_tx: mpsc::Sender<Message>,
    snapshot_tx: watch::Sender<TestSnapshot>,
    notice_tx: mpsc::Sender<Notice>,
}

impl TestController {
    /// Build a controller targeting the engine at `engine_url`.
    pub fn new(engine_url: impl Into<String>) -> (Self, ControllerHandle) {
        let (msg_tx, msg_rx) = mpsc::channel(MSG_CHANNEL_CAPACITY);
        let (notice_tx, notice_rx) = mpsc::channel(NOTICE_CHANNEL_CAPACITY);
        let session = TestSession::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let controller = Self {
            session,
            engine: None,
            engine_url: engine_url.into(),
            msg_rx,
            msg_tx: msg_tx.clone(),
            snapshot_tx,
            notice_tx,
        };
        let handle = ControllerHandle {
            msg_tx,
            snapshot_rx,
            notice_rx,
        };
        (controller, handle)
    }

    /// Run the event loop until [`Message::Shutdown`] arrives.
    ///
    /// Dropping the returned future also tears the session down: the engine
    /// connection handle is dropped with it, which closes any open socket.
    pub async fn run(mut self) {
        while let Some(message) = self.msg_rx.recv().await {
            if message == Message::Shutdown {
                if let Some(engine) = self.engine.take() {
                    engine.disconnect();
                }
                break;
            }
            self.dispatch(message);
        }
        debug!("controller loop exiting");
    }

    /// Feed one message through the state machine and publish the result.
    fn dispatch(&mut self, message: Message) {
        trace!("dispatching {:?}", message);
        let closed = message == Message::Engine(EngineEvent::Closed);

        let result = update(&mut self.session, message);
        if let Some(action) = result.action {
            self.perform(action);
        }

        if closed {
            // Session boundary: the connection task has exited. Dropping the
            // handle here guarantees nothing leaks into the next session.
            self.engine = None;
        }

        let _ = self.snapshot_tx.send(self.session.snapshot());
    }

    fn perform(&mut self, action: UpdateAction) {
        match action {
            UpdateAction::ConnectEngine(duration) => self.connect_engine(duration),
            UpdateAction::StopEngine => {
                match &self.engine {
                    Some(engine) => engine.stop(),
                    // Never connected or already torn down; closing is a no-op.
                    None => debug!("stop requested with no open connection"),
                }
            }
            UpdateAction::Notify(notice) => {
                if self.notice_tx.try_send(notice).is_err() {
                    warn!("notice channel full or closed, dropping notice");
                }
            }
        }
    }

    fn connect_engine(&mut self, duration: TestDuration) {
        if self.engine.is_some() {
            // The phase guard in update() makes this unreachable; keep the
            // old handle from outliving its session anyway.
            warn!("opening engine connection while one is still held");
        }

        let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        self.engine = Some(EngineConnection::open(
            &self.engine_url,
            duration,
            event_tx,
        ));

        // Forward engine events into the single message loop. The forwarder
        // ends when the connection task emits its final Closed event.
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                if msg_tx.send(Message::Engine(event)).await.is_err() {
                    break;
                }
            }
        });

        info!("engine connection opened for a {} test", duration);
    }
}

/// Caller-facing handle: the only write path into a session.
pub struct ControllerHandle {
    msg_tx: mpsc::Sender<Message>,
    snapshot_rx: watch::Receiver<TestSnapshot>,
    notice_rx: mpsc::Receiver<Notice>,
}

impl ControllerHandle {
    /// Request a new test. A silent no-op if one is already running.
    pub async fn start_test(&self, duration: TestDuration) -> Result<()> {
        self.msg_tx
            .send(Message::StartTest(duration))
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Request cancellation of the running test. Idempotent.
    pub async fn stop_test(&self) -> Result<()> {
        self.msg_tx
            .send(Message::StopTest)
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Tear the controller down, closing any open connection.
    pub async fn shutdown(&self) {
        let _ = self.msg_tx.send(Message::Shutdown).await;
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> TestSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A watch receiver for awaiting snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<TestSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Mutable access to the notice receiver.
    ///
    /// Callers can `recv()` on this to consume one-shot user notifications.
    pub fn notices(&mut self) -> &mut mpsc::Receiver<Notice> {
        &mut self.notice_rx
    }
}
