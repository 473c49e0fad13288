//! Engine connection task
//!
//! [`EngineConnection`] owns one WebSocket to the test engine for the length
//! of one session. A background tokio task dials the engine, sends the start
//! command, and then select-loops between inbound frames and a small command
//! channel. There is no reconnection: a failed or broken connection ends the
//! session and the controller surfaces it.
//!
//! ## Close guarantee
//!
//! The task emits [`EngineEvent::Closed`] exactly once, as its final event,
//! on every exit path: connect failure, read error, server close, stop
//! command, or handle drop. Consumers may rely on `Closed` as the single
//! finalization signal even when an `Error` event preceded it.

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use vmeter_core::prelude::*;
use vmeter_core::{EngineEvent, TestDuration};

use crate::protocol::{encode_command, parse_engine_frame, EngineCommand};

/// Capacity of the command channel. Commands are rare (stop, disconnect);
/// a full channel only ever means the task is already tearing down.
const CMD_CHANNEL_CAPACITY: usize = 8;

/// Internal messages sent from the handle to the background task.
enum ConnectionCommand {
    /// Send the stop command, then close the socket.
    Stop,
    /// Close the socket without sending stop (component teardown).
    Disconnect,
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Handle to one engine connection.
///
/// Created by [`EngineConnection::open`], which spawns the background I/O
/// task. Dropping the handle closes the command channel; the task observes
/// this and tears the socket down, so a connection can never outlive its
/// owner or leak across session boundaries.
pub struct EngineConnection {
    cmd_tx: mpsc::Sender<ConnectionCommand>,
}

impl EngineConnection {
    /// Dial `url` and drive one test session of `duration` seconds.
    ///
    /// Returns immediately; connection progress and failures arrive as
    /// events on `event_tx`. On a successful open the task sends the start
    /// command before reading anything.
    pub fn open(url: &str, duration: TestDuration, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(CMD_CHANNEL_CAPACITY);
        tokio::spawn(run_connection_task(
            url.to_string(),
            duration,
            cmd_rx,
            event_tx,
        ));
        Self { cmd_tx }
    }

    /// Request a stop: the task sends the stop command (if the socket is
    /// still writable) and closes. Idempotent; safe after the task exited.
    pub fn stop(&self) {
        let _ = self.cmd_tx.try_send(ConnectionCommand::Stop);
    }

    /// Close the socket without the stop command. Used on teardown paths
    /// where the session outcome no longer matters.
    pub fn disconnect(&self) {
        let _ = self.cmd_tx.try_send(ConnectionCommand::Disconnect);
    }
}

/// Entry point for the background I/O task.
async fn run_connection_task(
    url: String,
    duration: TestDuration,
    mut cmd_rx: mpsc::Receiver<ConnectionCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    run_session_io(&url, duration, &mut cmd_rx, &event_tx).await;

    // The one place Closed is produced. Receiver may already be gone on
    // teardown paths; that is fine.
    let _ = event_tx.send(EngineEvent::Closed).await;
    debug!("engine connection task exiting");
}

/// Dial, hand over the start command, and run the read/command loop.
/// Returning from this function means the socket is down or abandoned.
async fn run_session_io(
    url: &str,
    duration: TestDuration,
    cmd_rx: &mut mpsc::Receiver<ConnectionCommand>,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let ws_stream = match connect_async(url).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!("failed to connect to test engine at {}: {}", url, err);
            let _ = event_tx
                .send(EngineEvent::Error(format!("connect failed: {err}")))
                .await;
            return;
        }
    };
    info!("connected to test engine at {}", url);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    let start = encode_command(&EngineCommand::start(duration));
    if let Err(err) = ws_sink.send(WsMessage::Text(start.into())).await {
        warn!("failed to send start command: {}", err);
        let _ = event_tx
            .send(EngineEvent::Error(format!("start command failed: {err}")))
            .await;
        let _ = ws_sink.close().await;
        return;
    }
    debug!("start command sent ({})", duration);

    loop {
        tokio::select! {
            // ── Incoming WebSocket message ───────────────────────────────
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        // Malformed frames are dropped inside the parser.
                        if let Some(frame) = parse_engine_frame(text.as_str()) {
                            if event_tx.send(EngineEvent::Frame(frame)).await.is_err() {
                                // Consumer gone; nothing left to deliver to.
                                send_close(&mut ws_sink).await;
                                return;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("engine sent Close frame");
                        return;
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong/Binary -- ignore
                    }
                    Some(Err(err)) => {
                        warn!("WebSocket read error: {}", err);
                        let _ = event_tx
                            .send(EngineEvent::Error(format!("read failed: {err}")))
                            .await;
                        return;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        return;
                    }
                }
            }

            // ── Command from the handle ──────────────────────────────────
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ConnectionCommand::Stop) => {
                        let stop = encode_command(&EngineCommand::Stop);
                        if ws_sink.send(WsMessage::Text(stop.into())).await.is_err() {
                            debug!("stop command not delivered; socket already down");
                        }
                        send_close(&mut ws_sink).await;
                        return;
                    }
                    Some(ConnectionCommand::Disconnect) | None => {
                        // None: the handle was dropped -- close gracefully.
                        send_close(&mut ws_sink).await;
                        return;
                    }
                }
            }
        }
    }
}

/// Send a WebSocket Close frame, ignoring any write errors.
async fn send_close(ws_sink: &mut SplitSink<WsStream, WsMessage>) {
    let _ = ws_sink.send(WsMessage::Close(None)).await;
    let _ = ws_sink.close().await;
}
