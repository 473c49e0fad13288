//! # vmeter-engine - Test Engine Client
//!
//! Streaming protocol client for the external vortex test engine. The engine
//! speaks text-framed JSON over a WebSocket: the client sends `start`/`stop`
//! commands, the engine streams `data` frames and a final `end` frame.
//!
//! - [`protocol`] - outbound command encoding and inbound frame parsing
//! - [`connection`] - the background I/O task owning one WebSocket
//!
//! The connection layer deliberately has no opinion about session state: it
//! turns the wire into a stream of [`vmeter_core::EngineEvent`]s and
//! guarantees that the final event of every connection is a single `Closed`,
//! whatever path the teardown took. All sequencing rules live in the
//! controller that consumes the events.

pub mod connection;
pub mod protocol;

pub use connection::EngineConnection;
pub use protocol::{encode_command, parse_engine_frame, EngineCommand};
