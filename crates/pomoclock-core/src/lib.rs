//! # pomoclock core library
//!
//! This library provides the session scheduling engine behind the pomoclock
//! focus timer: timed work sessions alternating with short breaks, closed by a
//! long break, across a fixed number of cycles. The CLI is a thin collaborator
//! over the same core.
//!
//! ## Architecture
//!
//! - **Configuration**: validated, immutable durations and counts; invalid
//!   input is replaced by defaults rather than rejected
//! - **Ticker**: time source abstraction; the scheduler drains it from the
//!   host's event loop via `pump()`
//! - **SessionScheduler**: the state machine deciding which session runs next
//! - **Notifier**: listener registry receiving lifecycle events
//! - **Storage**: TOML-based user settings
//!
//! ## Key Components
//!
//! - [`SessionScheduler`]: Core scheduler state machine
//! - [`Configuration`]: Validated run configuration
//! - [`Notifier`]: Event listener registry
//! - [`Settings`]: User settings file

pub mod config;
pub mod error;
pub mod events;
pub mod notifier;
pub mod storage;
pub mod timer;

pub use config::{Configuration, Plan, RawConfig, Segment};
pub use error::{ConfigError, CoreError, Result};
pub use events::{Event, EventKind, Snapshot};
pub use notifier::{ListenerError, Notifier, SubscriptionId};
pub use storage::Settings;
pub use timer::{
    next_transition, ManualTicker, SessionKind, SessionScheduler, Ticker, Transition,
    WallClockTicker, QUANTUM_MS,
};
