//! Post-session aggregate computation

use crate::types::{HistoryEntry, Sample};

/// Arithmetic mean of each field over `history`, or `None` when empty.
///
/// Straightforward summation and division by count: sessions hold at most a
/// few tens of samples, so no weighting, outlier rejection, or compensated
/// summation is applied.
pub fn average(history: &[HistoryEntry]) -> Option<Sample> {
    if history.is_empty() {
        return None;
    }

    let mut totals = Sample::default();
    for entry in history {
        totals.ping += entry.sample.ping;
        totals.jitter += entry.sample.jitter;
        totals.down += entry.sample.down;
        totals.up += entry.sample.up;
        totals.loss += entry.sample.loss;
        totals.vortex += entry.sample.vortex;
    }

    let count = history.len() as f64;
    Some(Sample {
        ping: totals.ping / count,
        jitter: totals.jitter / count,
        down: totals.down / count,
        up: totals.up / count,
        loss: totals.loss / count,
        vortex: totals.vortex / count,
    })
}
