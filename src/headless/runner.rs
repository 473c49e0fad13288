//! Headless mode runner - one session, snapshot stream to stdout

use tracing::info;

use vmeter_app::{display_view, Settings, TestController};
use vmeter_core::prelude::*;
use vmeter_core::{TestDuration, TestSnapshot};

use super::HeadlessEvent;

/// Run one test session against the configured engine.
///
/// Emits NDJSON events for every sample, notice, and the final summary.
/// Ctrl-C cancels the running test through the same stop path a UI would
/// use; the partial history is still averaged and reported.
///
/// Returns an error when the session aborted before any sample arrived
/// (connection failure), so the process can exit non-zero.
pub async fn run_headless(settings: &Settings, duration: TestDuration) -> Result<()> {
    info!(
        "starting headless session: {} against {}",
        duration, settings.engine_url
    );

    let (controller, mut handle) = TestController::new(settings.engine_url.clone());
    let controller_task = tokio::spawn(controller.run());
    let mut snapshots = handle.subscribe();

    HeadlessEvent::session_started(duration.as_secs(), &settings.engine_url).emit();
    handle.start_test(duration).await?;

    let mut emitted_samples = 0usize;
    let mut notices_seen = 0usize;
    let mut saw_running = false;
    let mut stop_requested = false;

    let final_snapshot: TestSnapshot = loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // Controller gone; report whatever we last saw.
                    break snapshots.borrow().clone();
                }
                let snapshot = snapshots.borrow().clone();
                if snapshot.is_testing {
                    saw_running = true;
                }

                for entry in snapshot.history.iter().skip(emitted_samples) {
                    HeadlessEvent::sample(entry).emit();
                }
                emitted_samples = emitted_samples.max(snapshot.history.len());

                // Notices are sent before the snapshot that follows them,
                // so draining here cannot miss one.
                while let Ok(notice) = handle.notices().try_recv() {
                    notices_seen += 1;
                    HeadlessEvent::notice(&notice).emit();
                }

                // The watch channel coalesces rapid updates, so a session
                // that fails instantly may never show a Running snapshot;
                // a notice or computed averages also mark completion.
                let session_over =
                    saw_running || notices_seen > 0 || snapshot.averages.is_some();
                if session_over && !snapshot.is_testing {
                    break snapshot;
                }
            }

            _ = tokio::signal::ctrl_c(), if !stop_requested => {
                info!("interrupt received, stopping test");
                stop_requested = true;
                let _ = handle.stop_test().await;
            }
        }
    };

    let view = display_view(&final_snapshot);
    HeadlessEvent::summary(&final_snapshot, &view).emit();

    handle.shutdown().await;
    let _ = controller_task.await;
    info!("headless session finished");

    if final_snapshot.history.is_empty() && notices_seen > 0 {
        return Err(Error::connection(
            "test aborted before any samples arrived",
        ));
    }
    Ok(())
}
