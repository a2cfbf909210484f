//! The transient state of one in-progress timer session.

use chrono::{DateTime, Utc};

use crate::types::SessionKind;

/// Which thresholds have already fired in this session.
///
/// Reset to all-false when a session opens; once a flag is set the
/// corresponding nudge can never fire again for the same session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NudgeFlags {
    pub sixty_min_fired: bool,
    pub ninety_min_fired: bool,
    pub one_twenty_min_fired: bool,
}

/// One active building/debugging/learning interval.
///
/// Lives only while the timer runs; the durable counterpart is the open
/// [`TimeLogRecord`](crate::types::TimeLogRecord) named by
/// `pending_record_id`. A session is never fabricated without that
/// record - without a persisted anchor it could not be reconciled later.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSession {
    pub project_id: String,
    pub kind: SessionKind,
    /// Wall-clock instant the session opened. Elapsed time is always the
    /// delta from here, never a tick count, so jittery or missed ticks
    /// cannot make it drift.
    pub started_at: DateTime<Utc>,
    /// Last computed elapsed value, refreshed on every tick.
    pub elapsed_seconds: u64,
    pub pending_record_id: String,
    pub nudge_flags: NudgeFlags,
    /// Set by the explicit "continue anyway" choice after the debugging
    /// cutoff nudge; suppresses further forced stops for this session.
    pub extended_mode: bool,
}

impl TimerSession {
    pub fn open(
        project_id: &str,
        kind: SessionKind,
        pending_record_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id: project_id.to_string(),
            kind,
            started_at: now,
            elapsed_seconds: 0,
            pending_record_id: pending_record_id.to_string(),
            nudge_flags: NudgeFlags::default(),
            extended_mode: false,
        }
    }

    /// Whole seconds elapsed at `now`. Clocks that step backwards read
    /// as zero rather than wrapping.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        now.signed_duration_since(self.started_at)
            .num_seconds()
            .max(0) as u64
    }

    /// Fractional minutes elapsed at `now`; a 15-second session is 0.25
    /// minutes, not 0.
    pub fn elapsed_minutes_at(&self, now: DateTime<Utc>) -> f64 {
        self.elapsed_at(now) as f64 / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session_at(started_at: DateTime<Utc>) -> TimerSession {
        TimerSession::open("proj_a", SessionKind::Building, "time_a", started_at)
    }

    #[test]
    fn test_elapsed_is_wall_clock_delta() {
        let start = Utc::now();
        let session = session_at(start);
        assert_eq!(session.elapsed_at(start), 0);
        assert_eq!(session.elapsed_at(start + Duration::seconds(90)), 90);
        assert_eq!(session.elapsed_at(start + Duration::seconds(3700)), 3700);
    }

    #[test]
    fn test_elapsed_clamps_backwards_clock() {
        let start = Utc::now();
        let session = session_at(start);
        assert_eq!(session.elapsed_at(start - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_elapsed_minutes_preserves_fractions() {
        let start = Utc::now();
        let session = session_at(start);
        let minutes = session.elapsed_minutes_at(start + Duration::seconds(15));
        assert!((minutes - 0.25).abs() < f64::EPSILON);
    }
}
