//! # vmeter-app - Session Controller
//!
//! Owns the test session state machine and the runtime that drives it.
//!
//! - [`message`] - events the state machine reacts to, and user notices
//! - [`handler`] - the pure `update()` transition function (TEA pattern)
//! - [`controller`] - the event loop: executes actions, publishes snapshots
//! - [`display`] - the display value selector (live vs. final view)
//! - [`settings`] - configuration file loading and validation
//!
//! All state transitions happen inside [`handler::update`], one event at a
//! time, on the controller's single event loop. Observers get an immutable
//! [`vmeter_core::TestSnapshot`] after every transition and never a shared
//! reference into live state.

pub mod controller;
pub mod display;
pub mod handler;
pub mod message;
pub mod settings;

pub use controller::{ControllerHandle, TestController};
pub use display::{display_view, DisplayView, Metric, ViewMode};
pub use handler::{update, UpdateAction, UpdateResult};
pub use message::{Message, Notice};
pub use settings::Settings;
