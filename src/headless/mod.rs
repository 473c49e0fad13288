//! Headless mode - JSON event output
//!
//! The binary is a pure consumer of the controller's snapshot contract: it
//! renders state transitions as NDJSON (newline-delimited JSON) on stdout,
//! one event per line, so scripts and dashboards can follow a session
//! without scraping human-oriented output.
//!
//! # Example Output
//!
//! ```json
//! {"event":"session_started","duration_secs":15,"engine_url":"ws://127.0.0.1:9001","timestamp":1704700001000}
//! {"event":"sample","time":1,"ping":16.2,"jitter":2.1,"down":455.0,"up":210.0,"loss":0.0,"vortex":480.1,"timestamp":1704700002000}
//! {"event":"summary","samples":15,"metrics":[{"title":"Avg. Ping","value":16.4,"unit":"ms"}],"timestamp":1704700017000}
//! ```

pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use vmeter_app::{DisplayView, Metric, Notice};
use vmeter_core::{HistoryEntry, TestSnapshot};

/// One labeled metric in the final summary, as selected by the display
/// value selector (live titles while testing, "Avg." titles after).
#[derive(Debug, Clone, Serialize)]
pub struct MetricLine {
    pub title: String,
    pub value: f64,
    pub unit: &'static str,
}

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// A test session was requested
    SessionStarted {
        duration_secs: u64,
        engine_url: String,
        timestamp: i64,
    },

    /// One measurement sample arrived
    Sample {
        #[serde(flatten)]
        entry: HistoryEntry,
        timestamp: i64,
    },

    /// A user-visible notification (e.g. connection failure)
    Notice {
        title: String,
        body: String,
        timestamp: i64,
    },

    /// Final summary after the session settled
    Summary {
        samples: usize,
        metrics: Vec<MetricLine>,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // Write to stdout with newline (NDJSON format)
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        // Flush to ensure immediate output
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn session_started(duration_secs: u64, engine_url: &str) -> Self {
        Self::SessionStarted {
            duration_secs,
            engine_url: engine_url.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn sample(entry: &HistoryEntry) -> Self {
        Self::Sample {
            entry: *entry,
            timestamp: Self::now(),
        }
    }

    pub fn notice(notice: &Notice) -> Self {
        Self::Notice {
            title: notice.title.clone(),
            body: notice.body.clone(),
            timestamp: Self::now(),
        }
    }

    /// Build the summary from the final snapshot and its display view.
    pub fn summary(snapshot: &TestSnapshot, view: &DisplayView) -> Self {
        let metrics = Metric::ALL
            .iter()
            .map(|&metric| MetricLine {
                title: view.title(metric),
                value: metric.value(&view.values),
                unit: metric.unit(),
            })
            .collect();
        Self::Summary {
            samples: snapshot.history.len(),
            metrics,
            timestamp: Self::now(),
        }
    }
}
