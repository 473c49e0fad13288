//! Measurement domain types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Test lengths the engine accepts, in seconds.
pub const ALLOWED_DURATIONS: &[u64] = &[5, 15, 30, 60];

/// Default test length when none is chosen (matches the engine's default).
pub const DEFAULT_DURATION_SECS: u64 = 15;

/// One measurement snapshot from the test engine.
///
/// All fields are finite, non-negative numbers. Range semantics (e.g. loss
/// being a percentage, vortex being 0-500) belong to the engine and the
/// presentation layer; the client only ever checks finiteness.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Round-trip latency in milliseconds.
    pub ping: f64,
    /// Latency variation in milliseconds.
    pub jitter: f64,
    /// Download throughput in Mbps.
    pub down: f64,
    /// Upload throughput in Mbps.
    pub up: f64,
    /// Packet loss percentage (0-100).
    pub loss: f64,
    /// Composite connection-quality score (0-500, higher is better).
    pub vortex: f64,
}

impl Sample {
    /// Returns `true` when every field is a finite number.
    ///
    /// Frames carrying non-finite values are dropped at the protocol layer.
    pub fn is_finite(&self) -> bool {
        [
            self.ping,
            self.jitter,
            self.down,
            self.up,
            self.loss,
            self.vortex,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A sample tagged with its arrival-order index.
///
/// `time` is a 1-based sequence number assigned by the controller, not wall
/// clock time. For a history of length N the entries carry `time` values
/// exactly `1..=N` in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based arrival index within the session.
    pub time: u64,
    /// The measurement recorded at this index.
    #[serde(flatten)]
    pub sample: Sample,
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No test in progress. Initial state, and the state between tests.
    #[default]
    Idle,
    /// Connected (or connecting) and accepting data frames.
    Running,
    /// Transient: the transport closed and averages are being finalized.
    Completing,
}

/// A validated test duration.
///
/// The engine accepts a small fixed set of durations; construction fails for
/// anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TestDuration(u64);

impl TestDuration {
    /// Validate `secs` against [`ALLOWED_DURATIONS`].
    pub fn new(secs: u64) -> Result<Self> {
        if ALLOWED_DURATIONS.contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(Error::config(format!(
                "invalid test duration {}s (allowed: {:?})",
                secs, ALLOWED_DURATIONS
            )))
        }
    }

    /// The duration in whole seconds.
    pub fn as_secs(self) -> u64 {
        self.0
    }
}

impl Default for TestDuration {
    fn default() -> Self {
        Self(DEFAULT_DURATION_SECS)
    }
}

impl TryFrom<u64> for TestDuration {
    type Error = Error;

    fn try_from(secs: u64) -> Result<Self> {
        Self::new(secs)
    }
}

impl From<TestDuration> for u64 {
    fn from(duration: TestDuration) -> u64 {
        duration.as_secs()
    }
}

impl std::fmt::Display for TestDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}
