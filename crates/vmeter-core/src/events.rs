//! Engine event definitions

use crate::types::Sample;

/// A parsed inbound frame from the test engine.
///
/// Produced by the protocol layer; anything that does not parse into one of
/// these variants is discarded there and never reaches the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineFrame {
    /// One measurement sample.
    Data(Sample),
    /// The engine finished the test; the client should tear down.
    End,
}

/// Transport-level event delivered to the session state machine.
///
/// The connection task emits `Error` zero or more times and `Closed` exactly
/// once, as its final event. Errors never finalize a session on their own --
/// only `Closed` does. The two are not mutually exclusive on the underlying
/// transport, so aggregation is centralized at close.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A well-formed frame arrived.
    Frame(EngineFrame),
    /// The transport reported an error (connect failure, read error).
    Error(String),
    /// The transport is gone. Terminal; emitted exactly once per connection.
    Closed,
}

impl EngineEvent {
    /// Short description for logging.
    pub fn summary(&self) -> String {
        match self {
            EngineEvent::Frame(EngineFrame::Data(sample)) => {
                format!("data frame (vortex {:.0})", sample.vortex)
            }
            EngineEvent::Frame(EngineFrame::End) => "end frame".to_string(),
            EngineEvent::Error(message) => format!("transport error: {}", message),
            EngineEvent::Closed => "transport closed".to_string(),
        }
    }
}
