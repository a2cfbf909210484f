//! Stop-timer reconciliation: converts an in-memory session into a closed
//! time log record and applies its duration to the owning project's hour
//! totals.
//!
//! Best-effort two-step sequence, not a distributed transaction:
//!
//! 1. Close the pending record (`ended_at`, fractional `duration_minutes`).
//! 2. Read-modify-write the project aggregate for building/debugging kinds.
//!
//! Failure anywhere surfaces an error and leaves the caller's session
//! untouched so the stop can be retried. Retries are safe: step 1 closes
//! the same record id with a freshly recomputed duration, and whether the
//! record was already closed when an attempt starts is the single source
//! of truth for "hours already applied" - a retry that finds it closed
//! skips step 2. The worst accepted outcome is an under-counted project
//! total (logged); a session's record is never lost and hours are never
//! double-counted.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::store::kv::KvStore;
use crate::store::records;
use crate::types::TimeLogRecord;

use super::session::TimerSession;

/// Runs the reconciliation protocol for `session` at `now`.
///
/// On success the returned record is closed and, for building/debugging
/// sessions, the project's hour total reflects it. On error the caller
/// must keep the session (and its stop gate released) for a retry.
pub fn commit_stop(
    kv: &dyn KvStore,
    session: &TimerSession,
    now: DateTime<Utc>,
) -> Result<TimeLogRecord> {
    let elapsed_minutes = session.elapsed_minutes_at(now);

    let prior = records::get_time_log(kv, &session.pending_record_id)?.ok_or_else(|| {
        tracing::error!(
            record_id = %session.pending_record_id,
            "pending time log vanished; session kept for inspection"
        );
        crate::error::AutopilotError::TimeLogNotFound(session.pending_record_id.clone())
    })?;
    let hours_already_applied = !prior.is_open();

    let record = records::close_time_log(kv, &session.pending_record_id, now, elapsed_minutes)?;

    if hours_already_applied {
        tracing::warn!(
            record_id = %record.id,
            "record was already closed by an earlier attempt; skipping project hours"
        );
        return Ok(record);
    }

    if session.kind.counts_toward_project_hours() {
        let hours_delta = elapsed_minutes / 60.0;
        match records::add_project_hours(kv, &session.project_id, session.kind, hours_delta)? {
            Some(_) => {}
            None => {
                // Project deleted mid-session: the record stands on its own.
                tracing::warn!(
                    project_id = %session.project_id,
                    record_id = %record.id,
                    "project missing at stop; duration recorded without aggregate update"
                );
            }
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryKv;
    use crate::types::{NewProject, SessionKind};
    use chrono::Duration;

    fn setup(kind: SessionKind) -> (MemoryKv, TimerSession, DateTime<Utc>) {
        let kv = MemoryKv::new();
        let project = records::create_project(
            &kv,
            "u1",
            NewProject {
                name: "p".to_string(),
                ..NewProject::default()
            },
        )
        .unwrap();
        let start = Utc::now();
        let record =
            records::create_open_time_log(&kv, "u1", &project.id, kind, start).unwrap();
        let session = TimerSession::open(&project.id, kind, &record.id, start);
        (kv, session, start)
    }

    #[test]
    fn test_commit_closes_record_with_fractional_minutes() {
        let (kv, session, start) = setup(SessionKind::Building);
        let record = commit_stop(&kv, &session, start + Duration::seconds(15)).unwrap();

        assert!(!record.is_open());
        assert_eq!(record.duration_minutes, Some(0.25));

        let project = records::get_project(&kv, &session.project_id)
            .unwrap()
            .unwrap();
        assert!((project.building_hours - 0.25 / 60.0).abs() < 1e-12);
        assert_eq!(project.debugging_hours, 0.0);
    }

    #[test]
    fn test_commit_applies_debugging_hours_by_kind() {
        let (kv, session, start) = setup(SessionKind::Debugging);
        commit_stop(&kv, &session, start + Duration::seconds(3700)).unwrap();

        let project = records::get_project(&kv, &session.project_id)
            .unwrap()
            .unwrap();
        let expected = (3700.0 / 60.0) / 60.0;
        assert!((project.debugging_hours - expected).abs() < 1e-12);
        assert_eq!(project.building_hours, 0.0);
    }

    #[test]
    fn test_learning_session_skips_project_hours() {
        let (kv, session, start) = setup(SessionKind::Learning);
        let record = commit_stop(&kv, &session, start + Duration::seconds(600)).unwrap();
        assert_eq!(record.duration_minutes, Some(10.0));

        let project = records::get_project(&kv, &session.project_id)
            .unwrap()
            .unwrap();
        assert_eq!(project.total_hours(), 0.0);
    }

    #[test]
    fn test_retry_on_already_closed_record_never_double_counts() {
        let (kv, session, start) = setup(SessionKind::Building);

        commit_stop(&kv, &session, start + Duration::seconds(600)).unwrap();
        // A second attempt (caller believed the first failed) re-closes
        // with the later elapsed value but must not re-apply hours.
        let record = commit_stop(&kv, &session, start + Duration::seconds(900)).unwrap();
        assert_eq!(record.duration_minutes, Some(15.0));

        let project = records::get_project(&kv, &session.project_id)
            .unwrap()
            .unwrap();
        assert!((project.building_hours - 10.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_record_surfaces_not_found() {
        let (kv, mut session, start) = setup(SessionKind::Building);
        session.pending_record_id = "time_gone".to_string();
        let err = commit_stop(&kv, &session, start + Duration::seconds(60)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AutopilotError::TimeLogNotFound(_)
        ));
    }

    #[test]
    fn test_project_deleted_mid_session_still_closes_record() {
        let (kv, session, start) = setup(SessionKind::Building);
        records::delete_project(&kv, "u1", &session.project_id).unwrap();

        let record = commit_stop(&kv, &session, start + Duration::seconds(120)).unwrap();
        assert_eq!(record.duration_minutes, Some(2.0));
    }
}
