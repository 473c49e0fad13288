//! End-to-end session scenarios against the scripted mock engine

use std::time::Duration;

use vmeter_app::TestController;
use vmeter_core::TestDuration;

use super::mock_engine::{MockEngine, MockScript};
use crate::{data_frame, sample_with_down, wait_for_snapshot};

#[tokio::test]
async fn test_clean_run_completes_with_averages() {
    // Fifteen data frames with down = 10, 20, ..., 150, then a natural end.
    let script = MockScript {
        frames: (1..=15)
            .map(|i| data_frame(&sample_with_down((i * 10) as f64)))
            .collect(),
        send_end: true,
        wait_for_stop: true,
    };
    let mock = MockEngine::spawn(script).await;

    let (controller, handle) = TestController::new(mock.url.clone());
    let task = tokio::spawn(controller.run());
    let mut snapshots = handle.subscribe();

    handle
        .start_test(TestDuration::new(15).unwrap())
        .await
        .unwrap();

    wait_for_snapshot(&mut snapshots, |s| s.averages.is_some()).await;

    let snapshot = handle.snapshot();
    assert!(!snapshot.is_testing);
    assert_eq!(snapshot.history.len(), 15);
    for (i, entry) in snapshot.history.iter().enumerate() {
        assert_eq!(entry.time, i as u64 + 1);
    }
    assert_eq!(snapshot.averages.unwrap().down, 80.0);
    // The last sample remains visible as the current value.
    assert_eq!(snapshot.current.down, 150.0);

    // The engine saw the right duration, and the end frame was answered
    // with the same stop command a manual cancellation sends.
    let report = mock.report().await;
    assert_eq!(report.start_duration, Some(15));
    assert!(report.received_stop);

    handle.shutdown().await;
    task.await.unwrap();
}

#[tokio::test]
async fn test_manual_stop_aggregates_partial_history() {
    // Three frames, then the engine goes quiet until the client stops.
    let script = MockScript {
        frames: vec![
            data_frame(&sample_with_down(10.0)),
            data_frame(&sample_with_down(20.0)),
            data_frame(&sample_with_down(30.0)),
        ],
        send_end: false,
        wait_for_stop: true,
    };
    let mock = MockEngine::spawn(script).await;

    let (controller, handle) = TestController::new(mock.url.clone());
    let task = tokio::spawn(controller.run());
    let mut snapshots = handle.subscribe();

    handle.start_test(TestDuration::default()).await.unwrap();
    wait_for_snapshot(&mut snapshots, |s| s.history.len() == 3).await;

    handle.stop_test().await.unwrap();
    wait_for_snapshot(&mut snapshots, |s| !s.is_testing).await;

    // Averages cover exactly the three frames that arrived, not more.
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.history.len(), 3);
    assert_eq!(snapshot.averages.unwrap().down, 20.0);

    let report = mock.report().await;
    assert!(report.received_stop);

    handle.shutdown().await;
    task.await.unwrap();
}

#[tokio::test]
async fn test_malformed_frames_are_dropped_without_corruption() {
    let script = MockScript {
        frames: vec![
            data_frame(&sample_with_down(10.0)),
            "this is not json".to_string(),
            r#"{"type":"mystery"}"#.to_string(),
            r#"{"type":"data"}"#.to_string(),
            r#"{"type":"data","data":{"ping":1.0}}"#.to_string(),
            data_frame(&sample_with_down(30.0)),
        ],
        send_end: true,
        wait_for_stop: true,
    };
    let mock = MockEngine::spawn(script).await;

    let (controller, handle) = TestController::new(mock.url.clone());
    let task = tokio::spawn(controller.run());
    let mut snapshots = handle.subscribe();

    handle.start_test(TestDuration::default()).await.unwrap();
    wait_for_snapshot(&mut snapshots, |s| s.averages.is_some()).await;

    // Only the two well-formed frames made it, with contiguous indices.
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.history.len(), 2);
    assert_eq!(snapshot.history[0].time, 1);
    assert_eq!(snapshot.history[1].time, 2);
    assert_eq!(snapshot.averages.unwrap().down, 20.0);

    mock.report().await;
    handle.shutdown().await;
    task.await.unwrap();
}

#[tokio::test]
async fn test_connect_failure_notifies_once_and_settles_idle() {
    // Bind then drop a listener so nothing answers on the port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let (controller, mut handle) = TestController::new(url);
    let task = tokio::spawn(controller.run());
    let mut snapshots = handle.subscribe();

    handle.start_test(TestDuration::default()).await.unwrap();

    // The notice is the reliable signal; the short-lived Running snapshot
    // may be coalesced away by the watch channel on a fast failure.
    let notice = tokio::time::timeout(Duration::from_secs(5), handle.notices().recv())
        .await
        .expect("no notice before timeout")
        .expect("notice channel closed");
    assert_eq!(notice.title, "Connection Error");
    assert!(handle.notices().try_recv().is_err(), "exactly one notice");

    wait_for_snapshot(&mut snapshots, |s| !s.is_testing).await;

    let snapshot = handle.snapshot();
    assert!(snapshot.history.is_empty());
    assert!(snapshot.averages.is_none());

    handle.shutdown().await;
    task.await.unwrap();
}

#[tokio::test]
async fn test_double_start_keeps_a_single_session() {
    let script = MockScript {
        frames: (1..=5)
            .map(|i| data_frame(&sample_with_down((i * 10) as f64)))
            .collect(),
        send_end: true,
        wait_for_stop: true,
    };
    let mock = MockEngine::spawn(script).await;

    let (controller, handle) = TestController::new(mock.url.clone());
    let task = tokio::spawn(controller.run());
    let mut snapshots = handle.subscribe();

    // The second start must be swallowed by the phase guard; were a second
    // connection opened it would fail (the mock accepts only once) and its
    // synthetic close would finalize the session early.
    handle.start_test(TestDuration::default()).await.unwrap();
    handle.start_test(TestDuration::default()).await.unwrap();

    wait_for_snapshot(&mut snapshots, |s| s.averages.is_some()).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.history.len(), 5);
    assert_eq!(snapshot.averages.unwrap().down, 30.0);

    let report = mock.report().await;
    assert_eq!(report.start_duration, Some(15));

    handle.shutdown().await;
    task.await.unwrap();
}
