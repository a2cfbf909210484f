//! Timer state machine.
//!
//! Two states: `Idle` and `Running(TimerSession)`. There is no pause -
//! stopping always terminates the session. The machine is a plain data
//! type with transition methods; it never touches storage itself. The
//! engine drives it and runs the reconciliation protocol between
//! [`begin_stop`](TimerMachine::begin_stop) and
//! [`complete_stop`](TimerMachine::complete_stop) /
//! [`abort_stop`](TimerMachine::abort_stop).
//!
//! The one-active-timer rule lives here, not in presentation logic: a
//! `begin_session` while running is rejected no matter who the caller is.

use chrono::{DateTime, Utc};

use crate::config::NudgeThresholds;
use crate::error::{AutopilotError, Result};
use crate::types::SessionKind;

use super::nudge::{self, NudgeEffect};
use super::session::TimerSession;

#[derive(Debug, Clone, PartialEq)]
pub enum TimerState {
    Idle,
    Running(TimerSession),
}

/// What one tick observed: the refreshed elapsed value and whatever the
/// nudge policy asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub elapsed_seconds: u64,
    pub effect: NudgeEffect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimerMachine {
    state: TimerState,
    /// Gates reconciliation entry so two stop attempts cannot race.
    stopping: bool,
}

impl Default for TimerMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerMachine {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            stopping: false,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn session(&self) -> Option<&TimerSession> {
        match &self.state {
            TimerState::Running(session) => Some(session),
            TimerState::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running(_))
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// Opens a session around an already-created open time log record.
    /// Rejected while another session is running.
    pub fn begin_session(
        &mut self,
        project_id: &str,
        kind: SessionKind,
        pending_record_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let TimerState::Running(session) = &self.state {
            return Err(AutopilotError::AlreadyRunning {
                project_id: session.project_id.clone(),
            });
        }

        self.state = TimerState::Running(TimerSession::open(
            project_id,
            kind,
            pending_record_id,
            now,
        ));
        self.stopping = false;
        tracing::debug!(project_id, kind = kind.as_str(), "timer session opened");
        Ok(())
    }

    /// Refreshes elapsed time from the wall clock and evaluates the nudge
    /// policy. Pure computation; any `NotifyAndStop` in the report is for
    /// the caller to act on.
    pub fn tick(&mut self, now: DateTime<Utc>, thresholds: &NudgeThresholds) -> Result<TickReport> {
        let TimerState::Running(session) = &mut self.state else {
            return Err(AutopilotError::NotRunning);
        };

        session.elapsed_seconds = session.elapsed_at(now);
        let (flags, effect) = nudge::evaluate(
            session.kind,
            session.elapsed_seconds,
            session.nudge_flags,
            session.extended_mode,
            thresholds,
        );
        session.nudge_flags = flags;

        Ok(TickReport {
            elapsed_seconds: session.elapsed_seconds,
            effect,
        })
    }

    /// Opts the active debugging session out of further forced stops.
    pub fn mark_extended(&mut self) -> Result<()> {
        let TimerState::Running(session) = &mut self.state else {
            return Err(AutopilotError::NotRunning);
        };
        if session.kind != SessionKind::Debugging {
            return Err(AutopilotError::NotDebugging);
        }

        session.extended_mode = true;
        tracing::info!(
            project_id = %session.project_id,
            "extended debugging: cutoff suppressed for this session"
        );
        Ok(())
    }

    /// Claims the stop gate and returns a snapshot of the session for
    /// reconciliation. The session itself stays in place untouched until
    /// [`complete_stop`](Self::complete_stop).
    pub fn begin_stop(&mut self) -> Result<TimerSession> {
        let TimerState::Running(session) = &self.state else {
            return Err(AutopilotError::NotRunning);
        };
        if self.stopping {
            return Err(AutopilotError::AlreadyStopping);
        }

        self.stopping = true;
        Ok(session.clone())
    }

    /// Reconciliation succeeded: drop the session and return to idle.
    pub fn complete_stop(&mut self) {
        self.state = TimerState::Idle;
        self.stopping = false;
    }

    /// Reconciliation failed: release the gate and keep the session fully
    /// intact so the caller can retry without losing accrued time.
    pub fn abort_stop(&mut self) {
        self.stopping = false;
    }
}
