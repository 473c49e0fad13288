//! Message types for the session controller (TEA pattern)

use vmeter_core::{EngineEvent, TestDuration};

/// All events the session state machine reacts to.
///
/// Exactly four external event sources exist: the two caller entry points,
/// engine transport events, and controller teardown. They are processed one
/// at a time on the controller loop, never concurrently.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Caller requested a new test of the given duration.
    StartTest(TestDuration),
    /// Caller requested cancellation of the running test.
    StopTest,
    /// Event from the engine transport (frame, error, or close).
    Engine(EngineEvent),
    /// Tear the controller down, closing any open connection.
    Shutdown,
}

/// A one-shot user-visible notification.
///
/// Emitted for conditions the user should see (a failed connection); never
/// used for flow control. The presentation layer decides how to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// The standard notice for a failed or broken engine connection.
    pub fn connection_error(detail: impl Into<String>) -> Self {
        Self::new(
            "Connection Error",
            format!(
                "Could not reach the test engine ({}). Ensure the engine process is running.",
                detail.into()
            ),
        )
    }
}
