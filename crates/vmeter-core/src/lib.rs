//! # vmeter-core - Core Domain Types
//!
//! Foundation crate for Vortex Meter. Provides the measurement domain types,
//! engine event definitions, aggregate computation, error handling, and
//! logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Sample`] - One measurement snapshot (ping, jitter, down, up, loss, vortex)
//! - [`HistoryEntry`] - A sample tagged with a 1-based arrival-order index
//! - [`SessionPhase`] - Session lifecycle phase (Idle, Running, Completing)
//! - [`TestDuration`] - Test length validated against the allowed set
//!
//! ### Session State (`session`)
//! - [`TestSession`] - The controller-owned session state
//! - [`TestSnapshot`] - Immutable view handed to observers after each transition
//!
//! ### Events (`events`)
//! - [`EngineFrame`] - Parsed inbound frames from the test engine
//! - [`EngineEvent`] - Transport-level events delivered to the state machine
//!
//! ### Aggregation (`stats`)
//! - [`average()`] - Per-field arithmetic mean over a history
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use vmeter_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod session;
pub mod stats;
pub mod types;

/// Prelude for common imports used throughout all Vortex Meter crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use events::{EngineEvent, EngineFrame};
pub use session::{TestSession, TestSnapshot};
pub use stats::average;
pub use types::{
    HistoryEntry, Sample, SessionPhase, TestDuration, ALLOWED_DURATIONS, DEFAULT_DURATION_SECS,
};
