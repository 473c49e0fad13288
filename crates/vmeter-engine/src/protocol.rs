//! JSON wire protocol for the test engine
//!
//! Client to server:
//!
//! | type    | fields               |
//! |---------|----------------------|
//! | `start` | `duration` (seconds) |
//! | `stop`  | --                   |
//!
//! Server to client:
//!
//! | type   | fields           |
//! |--------|------------------|
//! | `data` | `data`: a sample |
//! | `end`  | --               |
//!
//! Anything inbound that does not match one of the server frame shapes is
//! discarded with an error log. A dropped frame never crashes the client or
//! touches session state.

use serde::{Deserialize, Serialize};
use tracing::error;

use vmeter_core::{EngineFrame, Sample, TestDuration};

/// Outbound command to the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineCommand {
    /// Begin a test of the given duration.
    Start { duration: u64 },
    /// Request immediate termination.
    Stop,
}

impl EngineCommand {
    pub fn start(duration: TestDuration) -> Self {
        Self::Start {
            duration: duration.as_secs(),
        }
    }
}

/// Serialize a command to its wire form.
pub fn encode_command(command: &EngineCommand) -> String {
    // Both variants are plain tagged structs; serialization cannot fail.
    serde_json::to_string(command).unwrap_or_default()
}

/// Raw inbound frame (before validation)
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawFrame {
    Data { data: Sample },
    End,
}

/// Parse one inbound text frame into a typed [`EngineFrame`].
///
/// Returns `None` for malformed JSON, unknown `type` values, `data` frames
/// with a missing or ill-shaped payload, and samples carrying non-finite
/// numbers. Every rejection is logged with a truncated copy of the frame.
pub fn parse_engine_frame(text: &str) -> Option<EngineFrame> {
    match serde_json::from_str::<RawFrame>(text) {
        Ok(RawFrame::Data { data }) if data.is_finite() => Some(EngineFrame::Data(data)),
        Ok(RawFrame::Data { .. }) => {
            error!("discarding data frame with non-finite fields: {}", preview(text));
            None
        }
        Ok(RawFrame::End) => Some(EngineFrame::End),
        Err(err) => {
            error!("discarding unparseable frame ({}): {}", err, preview(text));
            None
        }
    }
}

/// First 120 bytes of a frame, for log lines.
fn preview(text: &str) -> &str {
    let end = text
        .char_indices()
        .take_while(|(i, _)| *i < 120)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &text[..end]
}
