//! Session state machine - the update function (TEA pattern)
//!
//! Every external event flows through [`update`] as a [`Message`]; the
//! function mutates the owned [`TestSession`] and returns at most one
//! [`UpdateAction`] for the controller loop to execute. Keeping the
//! transitions here, free of I/O, makes each rule independently testable.

use tracing::{debug, warn};

use vmeter_core::{EngineEvent, EngineFrame, SessionPhase, TestDuration, TestSession};

use crate::message::{Message, Notice};

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Open a connection to the engine and send the start command.
    ConnectEngine(TestDuration),
    /// Send the stop command (if the socket is open) and close the transport.
    StopEngine,
    /// Emit a one-shot user-visible notification.
    Notify(Notice),
}

/// Result of one update: at most one action for the runtime to perform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateResult {
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            action: Some(action),
        }
    }
}

/// Process a message and update session state.
pub fn update(session: &mut TestSession, message: Message) -> UpdateResult {
    match message {
        Message::StartTest(duration) => {
            // Guard: a second start while Running must not reopen a second
            // connection or clear the accumulating history.
            if session.phase != SessionPhase::Idle {
                debug!("start ignored: test already in progress");
                return UpdateResult::none();
            }
            session.begin(duration);
            UpdateResult::action(UpdateAction::ConnectEngine(duration))
        }

        Message::StopTest => {
            if session.phase != SessionPhase::Running {
                debug!("stop ignored: no test in progress");
                return UpdateResult::none();
            }
            UpdateResult::action(UpdateAction::StopEngine)
        }

        Message::Engine(EngineEvent::Frame(EngineFrame::Data(sample))) => {
            // A late frame after close must not resurrect state.
            if session.phase != SessionPhase::Running {
                debug!("data frame ignored outside a running session");
                return UpdateResult::none();
            }
            session.record_sample(sample);
            UpdateResult::none()
        }

        Message::Engine(EngineEvent::Frame(EngineFrame::End)) => {
            // The engine signals natural completion; mirror the manual stop
            // so there is exactly one teardown code path.
            if session.phase != SessionPhase::Running {
                debug!("end frame ignored outside a running session");
                return UpdateResult::none();
            }
            UpdateResult::action(UpdateAction::StopEngine)
        }

        Message::Engine(EngineEvent::Error(detail)) => {
            // Errors never finalize the session; the close event that
            // follows does. Error and close are not mutually exclusive on
            // the transport, so aggregating here would risk doing it twice.
            warn!("engine transport error: {}", detail);
            UpdateResult::action(UpdateAction::Notify(Notice::connection_error(detail)))
        }

        Message::Engine(EngineEvent::Closed) => {
            if session.phase != SessionPhase::Running {
                debug!("close ignored: session already idle");
                return UpdateResult::none();
            }
            // The single point where averages are produced.
            session.finalize();
            UpdateResult::none()
        }

        // Teardown is handled by the controller loop itself.
        Message::Shutdown => UpdateResult::none(),
    }
}
