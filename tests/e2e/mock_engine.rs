//! Mock vortex test engine for integration testing
//!
//! Serves exactly one WebSocket session on an ephemeral local port,
//! following a fixed script instead of measuring anything. The mock:
//!
//! 1. waits for the client's `start` command and records its duration;
//! 2. sends the scripted text frames verbatim (letting tests inject
//!    malformed ones);
//! 3. optionally sends `{"type":"end"}`;
//! 4. optionally lingers to record whether a `stop` command arrives before
//!    closing.
//!
//! The handshake and framing go over a real socket, so the client under
//! test exercises the same transport code paths it uses in production.

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Script for the mock's single session.
#[derive(Debug, Default)]
pub struct MockScript {
    /// Text frames sent verbatim once the start command has arrived.
    pub frames: Vec<String>,
    /// Send `{"type":"end"}` after the frames.
    pub send_end: bool,
    /// Keep the connection open after the script and record a `stop`.
    pub wait_for_stop: bool,
}

/// What the mock observed during the session.
#[derive(Debug, Default)]
pub struct MockEngineReport {
    /// Duration carried by the client's start command.
    pub start_duration: Option<u64>,
    /// Whether a stop command arrived before the connection closed.
    pub received_stop: bool,
}

/// A running mock engine.
pub struct MockEngine {
    /// WebSocket URL clients should dial.
    pub url: String,
    handle: tokio::task::JoinHandle<MockEngineReport>,
}

impl MockEngine {
    /// Bind an ephemeral port and serve one scripted session.
    pub async fn spawn(script: MockScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock engine port");
        let url = format!("ws://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(serve_session(listener, script));
        Self { url, handle }
    }

    /// Wait for the session to finish and return what the mock saw.
    pub async fn report(self) -> MockEngineReport {
        self.handle.await.expect("mock engine task panicked")
    }
}

async fn serve_session(listener: TcpListener, script: MockScript) -> MockEngineReport {
    let mut report = MockEngineReport::default();

    let (stream, _) = listener.accept().await.expect("client never connected");
    let mut ws = accept_async(stream).await.expect("WS handshake failed");

    // The client's first frame is always the start command.
    while let Some(Ok(msg)) = ws.next().await {
        if let WsMessage::Text(text) = msg {
            let value: serde_json::Value =
                serde_json::from_str(text.as_str()).expect("client sent non-JSON");
            assert_eq!(value["type"], "start", "first command must be start");
            report.start_duration = value["duration"].as_u64();
            break;
        }
    }

    for frame in &script.frames {
        if ws.send(WsMessage::Text(frame.clone().into())).await.is_err() {
            return report;
        }
    }

    if script.send_end {
        let _ = ws
            .send(WsMessage::Text(json!({ "type": "end" }).to_string().into()))
            .await;
    }

    if script.wait_for_stop {
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                WsMessage::Text(text) => {
                    let value: serde_json::Value =
                        serde_json::from_str(text.as_str()).unwrap_or_default();
                    if value["type"] == "stop" {
                        report.received_stop = true;
                        break;
                    }
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
    }

    let _ = ws.close(None).await;
    report
}
