//! Display value selector
//!
//! A pure function of the latest snapshot: once a session has settled back
//! into Idle with averages available, the final averaged values are shown
//! with "Avg." titles; at every other moment the live current sample is
//! shown. No state of its own, so it can be called at any point and always
//! agrees with the snapshot it was given.

use vmeter_core::{Sample, TestSnapshot};

/// Which set of values a view is presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Live values from the running (or never-run) session.
    Live,
    /// Final averaged values of the last completed session.
    Final,
}

/// The six presented metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Ping,
    Jitter,
    Download,
    Upload,
    PacketLoss,
    Vortex,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Ping,
        Metric::Jitter,
        Metric::Download,
        Metric::Upload,
        Metric::PacketLoss,
        Metric::Vortex,
    ];

    /// Base label, without the averaging prefix.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Ping => "Ping",
            Metric::Jitter => "Jitter",
            Metric::Download => "Download",
            Metric::Upload => "Upload",
            Metric::PacketLoss => "Packet Loss",
            Metric::Vortex => "Vortex",
        }
    }

    /// Display unit.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Ping | Metric::Jitter => "ms",
            Metric::Download | Metric::Upload => "Mbps",
            Metric::PacketLoss => "%",
            Metric::Vortex => "",
        }
    }

    /// Pull this metric's value out of a sample.
    pub fn value(self, sample: &Sample) -> f64 {
        match self {
            Metric::Ping => sample.ping,
            Metric::Jitter => sample.jitter,
            Metric::Download => sample.down,
            Metric::Upload => sample.up,
            Metric::PacketLoss => sample.loss,
            Metric::Vortex => sample.vortex,
        }
    }
}

/// The values and labeling a presentation layer should render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayView {
    pub mode: ViewMode,
    pub values: Sample,
}

impl DisplayView {
    /// Title for one metric under this view's mode.
    pub fn title(&self, metric: Metric) -> String {
        match self.mode {
            ViewMode::Live => metric.label().to_string(),
            ViewMode::Final => format!("Avg. {}", metric.label()),
        }
    }
}

/// Select what to display for the given snapshot.
pub fn display_view(snapshot: &TestSnapshot) -> DisplayView {
    match snapshot.averages {
        Some(averages) if !snapshot.is_testing => DisplayView {
            mode: ViewMode::Final,
            values: averages,
        },
        _ => DisplayView {
            mode: ViewMode::Live,
            values: snapshot.current,
        },
    }
}
