//! Controller-owned session state and the observer snapshot contract

use serde::Serialize;

use crate::stats;
use crate::types::{HistoryEntry, Sample, SessionPhase, TestDuration};

/// Full state of one test session.
///
/// Exclusively owned and mutated by the session controller; everything else
/// sees [`TestSnapshot`] values taken after each transition. The lifecycle
/// methods here carry no phase guards: those, and the transition rules,
/// live in the controller's update function, which is the single entry point
/// for every event.
#[derive(Debug, Clone, Default)]
pub struct TestSession {
    /// Current lifecycle phase.
    pub phase: SessionPhase,
    /// Chosen test length. Immutable while Running.
    pub duration: TestDuration,
    /// Latest sample, or all-zero before any data arrives.
    pub current: Sample,
    /// Samples received this session, in arrival order.
    pub history: Vec<HistoryEntry>,
    /// Per-field means over `history`. Present only after a session with at
    /// least one sample has completed.
    pub averages: Option<Sample>,
}

impl TestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a fresh run and enter the Running phase.
    ///
    /// Clears the previous run's samples and averages so the observer view
    /// starts from zero, as the engine connection is being opened.
    pub fn begin(&mut self, duration: TestDuration) {
        self.phase = SessionPhase::Running;
        self.duration = duration;
        self.current = Sample::default();
        self.history.clear();
        self.averages = None;
    }

    /// Record one inbound sample, assigning the next arrival index.
    pub fn record_sample(&mut self, sample: Sample) {
        self.current = sample;
        let time = self.history.len() as u64 + 1;
        self.history.push(HistoryEntry { time, sample });
    }

    /// Finalize the run: compute averages over whatever arrived and settle
    /// back into Idle.
    ///
    /// The transient Completing phase exists only inside this transition;
    /// observers see the Idle snapshot that carries the fresh averages.
    pub fn finalize(&mut self) {
        self.phase = SessionPhase::Completing;
        self.averages = stats::average(&self.history);
        self.phase = SessionPhase::Idle;
    }

    /// `true` while a test is in progress.
    pub fn is_testing(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Take an immutable snapshot for observers.
    pub fn snapshot(&self) -> TestSnapshot {
        TestSnapshot {
            is_testing: self.is_testing(),
            current: self.current,
            history: self.history.clone(),
            averages: self.averages,
        }
    }
}

/// Immutable view of a session, published after every state transition.
///
/// This is the whole contract between the controller and any presentation
/// layer: a consumer renders this value and writes back only through the
/// controller's start/stop entry points.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestSnapshot {
    /// `true` while a test is in progress.
    pub is_testing: bool,
    /// Latest sample (all-zero before any data).
    pub current: Sample,
    /// Samples received so far, in arrival order with 1-based indices.
    pub history: Vec<HistoryEntry>,
    /// Final per-field means; `None` until a non-empty session completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub averages: Option<Sample>,
}
