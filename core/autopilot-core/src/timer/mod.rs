//! The session-timer engine: active-session state, the threshold nudge
//! policy, the state machine, and the stop-timer reconciliation protocol.
//!
//! One logical timer per operator, advanced by a strictly sequential
//! periodic tick. Elapsed time is always the wall-clock delta from the
//! session's start, never a tick count, so an unreliable tick source
//! cannot make the display or the persisted duration drift.

pub mod machine;
pub mod nudge;
pub mod reconcile;
pub mod session;

pub use machine::{TickReport, TimerMachine, TimerState};
pub use nudge::{Nudge, NudgeEffect};
pub use session::{NudgeFlags, TimerSession};
