//! # autopilot-core
//!
//! Core library for Project Autopilot, providing the timer engine and
//! tracking logic shared by all clients (web dashboard, CLI, tests).
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Clients can wrap with async if needed.
//! - **Not thread-safe**: Clients provide their own synchronization (`Mutex`, `RwLock`).
//! - **Storage behind a trait**: Persistence is a key-value collaborator; the
//!   in-memory backend serves tests and local use.
//! - **Time never lost**: a failed stop leaves the running session intact and
//!   retryable; no error path discards tracked time.
//! - **Single source of truth**: All clients share these types and logic.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use autopilot_core::{AutopilotEngine, SessionKind};
//!
//! let mut engine = AutopilotEngine::in_memory();
//! let project = engine.create_project(new_project)?;
//! engine.start_timer(&project.id, SessionKind::Building)?;
//! let outcome = engine.tick()?;
//! let record = engine.stop_timer()?;
//! ```

// Public modules
pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;
pub mod timer;
pub mod types;

// Re-export commonly used items at crate root
pub use analytics::{AnalyticsSummary, DashboardMetrics, Insight};
pub use config::{EngineConfig, NudgeThresholds};
pub use engine::{AutopilotEngine, TickOutcome};
pub use error::{AutopilotError, Result};
pub use store::{KvStore, MemoryKv};
pub use timer::{Nudge, NudgeEffect, NudgeFlags, TickReport, TimerMachine, TimerSession, TimerState};
pub use types::*;
