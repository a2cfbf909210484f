//! AutopilotEngine - the main entry point for dashboard clients.
//!
//! One engine per operator, owning the timer machine, the engine
//! configuration and a handle to the key-value collaborator. Designed to
//! be:
//! - **Synchronous**: no async runtime required; an async client wraps
//!   calls itself.
//! - **Not thread-safe**: callers provide their own synchronization.
//! - **Authoritative**: invariants like "one running timer" and the
//!   active-project limit are enforced here, not in presentation logic.
//!
//! Timer methods come in pairs: `start_timer()` uses the real clock and
//! `start_timer_at(now)` takes an explicit instant (same for tick/stop).
//! Clients use the former; tests drive simulated clocks through the
//! latter.

use chrono::{DateTime, Utc};

use crate::analytics::{self, AnalyticsSummary, DashboardMetrics, Insight};
use crate::config::EngineConfig;
use crate::error::{AutopilotError, Result};
use crate::store::kv::{KvStore, MemoryKv};
use crate::store::records;
use crate::timer::machine::TimerMachine;
use crate::timer::nudge::NudgeEffect;
use crate::timer::reconcile;
use crate::timer::session::TimerSession;
use crate::types::{
    ColleagueRequest, DebugLog, LearningLog, NewColleagueRequest, NewDebugLog, NewLearningLog,
    NewProject, NewWeeklyReview, Project, ProjectPatch, ProjectStatus, RequestPatch, SessionKind,
    TimeLogRecord, WeeklyReview,
};

/// What one engine tick produced.
///
/// `auto_stop` is present only when the tick's effect was a cutoff
/// (`NotifyAndStop`): `Ok` carries the closed record, `Err` means the
/// reconciliation failed and the session is still running - tracked time
/// is preserved and the stop can be retried.
#[derive(Debug)]
pub struct TickOutcome {
    pub elapsed_seconds: u64,
    pub effect: NudgeEffect,
    pub auto_stop: Option<Result<TimeLogRecord>>,
}

/// The main engine for Project Autopilot operations.
pub struct AutopilotEngine {
    kv: Box<dyn KvStore>,
    config: EngineConfig,
    timer: TimerMachine,
}

impl AutopilotEngine {
    pub fn new(kv: Box<dyn KvStore>, config: EngineConfig) -> Self {
        Self {
            kv,
            config,
            timer: TimerMachine::new(),
        }
    }

    /// An engine over the in-memory store with default configuration.
    /// Used by tests and local demo clients.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryKv::new()), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn user_id(&self) -> &str {
        &self.config.user_id
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Timer API
    // ─────────────────────────────────────────────────────────────────────────────

    /// The active session, if a timer is running. For display only;
    /// mutation goes through the timer methods.
    pub fn active_session(&self) -> Option<&TimerSession> {
        self.timer.session()
    }

    pub fn start_timer(&mut self, project_id: &str, kind: SessionKind) -> Result<TimeLogRecord> {
        self.start_timer_at(project_id, kind, Utc::now())
    }

    /// Starts a session: creates the open time log first, then opens the
    /// in-memory session around it. If record creation fails the machine
    /// stays idle - a session without a persisted anchor could never be
    /// reconciled.
    pub fn start_timer_at(
        &mut self,
        project_id: &str,
        kind: SessionKind,
        now: DateTime<Utc>,
    ) -> Result<TimeLogRecord> {
        if let Some(session) = self.timer.session() {
            return Err(AutopilotError::AlreadyRunning {
                project_id: session.project_id.clone(),
            });
        }
        records::get_project(self.kv.as_ref(), project_id)?
            .ok_or_else(|| AutopilotError::ProjectNotFound(project_id.to_string()))?;

        let record =
            records::create_open_time_log(self.kv.as_ref(), self.user_id(), project_id, kind, now)?;
        self.timer.begin_session(project_id, kind, &record.id, now)?;
        Ok(record)
    }

    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.tick_at(Utc::now())
    }

    /// Advances the timer to `now`. A cutoff effect triggers the same
    /// stop path a manual stop uses; its outcome rides along in the
    /// report rather than failing the tick, because the nudge itself
    /// still needs to reach the user.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let report = self.timer.tick(now, &self.config.thresholds)?;

        let auto_stop = if matches!(report.effect, NudgeEffect::NotifyAndStop(_)) {
            Some(self.stop_timer_at(now))
        } else {
            None
        };

        Ok(TickOutcome {
            elapsed_seconds: report.elapsed_seconds,
            effect: report.effect,
            auto_stop,
        })
    }

    pub fn stop_timer(&mut self) -> Result<TimeLogRecord> {
        self.stop_timer_at(Utc::now())
    }

    /// Stops the running session through the reconciliation protocol.
    ///
    /// On failure the session stays running, fully intact: tracked time
    /// is not lost and calling stop again is safe. That message is part
    /// of the contract - surface it to the user verbatim.
    pub fn stop_timer_at(&mut self, now: DateTime<Utc>) -> Result<TimeLogRecord> {
        let session = self.timer.begin_stop()?;

        match reconcile::commit_stop(self.kv.as_ref(), &session, now) {
            Ok(record) => {
                self.timer.complete_stop();
                tracing::info!(
                    record_id = %record.id,
                    kind = session.kind.as_str(),
                    minutes = record.duration_minutes.unwrap_or_default(),
                    "timer stopped"
                );
                Ok(record)
            }
            Err(err) => {
                self.timer.abort_stop();
                tracing::warn!(
                    error = %err,
                    record_id = %session.pending_record_id,
                    "stop failed; session kept running, retry is safe"
                );
                Err(err)
            }
        }
    }

    /// The "continue anyway" action after the 90-minute debugging nudge:
    /// suppresses the cutoff for the rest of this session.
    pub fn continue_extended_debugging(&mut self) -> Result<()> {
        self.timer.mark_extended()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Projects API
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a project, enforcing the active-project limit.
    pub fn create_project(&mut self, new: NewProject) -> Result<Project> {
        let active = records::active_project_count(self.kv.as_ref(), self.user_id())?;
        if active >= self.config.active_project_limit {
            return Err(AutopilotError::ProjectLimitReached(
                self.config.active_project_limit,
            ));
        }
        records::create_project(self.kv.as_ref(), self.user_id(), new)
    }

    pub fn get_project(&self, project_id: &str) -> Result<Project> {
        records::get_project(self.kv.as_ref(), project_id)?
            .ok_or_else(|| AutopilotError::ProjectNotFound(project_id.to_string()))
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        records::list_projects(self.kv.as_ref(), self.user_id())
    }

    pub fn update_project(&mut self, project_id: &str, patch: ProjectPatch) -> Result<Project> {
        records::update_project(self.kv.as_ref(), project_id, patch)
    }

    /// Deletes a project. A timer running against it keeps running; its
    /// record closes normally and the aggregate update is skipped because
    /// the project is gone.
    pub fn delete_project(&mut self, project_id: &str) -> Result<()> {
        records::delete_project(self.kv.as_ref(), self.user_id(), project_id)
    }

    pub fn pause_project(&mut self, project_id: &str) -> Result<Project> {
        records::update_project(
            self.kv.as_ref(),
            project_id,
            ProjectPatch {
                status: Some(ProjectStatus::Paused),
                ..ProjectPatch::default()
            },
        )
    }

    pub fn complete_project(&mut self, project_id: &str) -> Result<Project> {
        records::update_project(
            self.kv.as_ref(),
            project_id,
            ProjectPatch {
                status: Some(ProjectStatus::Complete),
                progress: Some(100),
                completed_at: Some(Utc::now()),
                ..ProjectPatch::default()
            },
        )
    }

    /// Maintenance: zeroes every project's hour totals.
    pub fn reset_all_hours(&mut self) -> Result<Vec<Project>> {
        let projects = self.list_projects()?;
        let mut updated = Vec::with_capacity(projects.len());
        for project in projects {
            updated.push(records::update_project(
                self.kv.as_ref(),
                &project.id,
                ProjectPatch {
                    building_hours: Some(0.0),
                    debugging_hours: Some(0.0),
                    ..ProjectPatch::default()
                },
            )?);
        }
        Ok(updated)
    }

    pub fn active_project_count(&self) -> Result<u32> {
        records::active_project_count(self.kv.as_ref(), self.user_id())
    }

    /// Maintenance: deletes every record the operator owns. A running
    /// timer keeps running; its eventual stop surfaces `TimeLogNotFound`
    /// and preserves the session, like any other vanished record.
    pub fn clear_all_data(&mut self) -> Result<()> {
        records::clear_user_data(self.kv.as_ref(), self.user_id())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Time Logs API
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn list_time_logs(&self, limit: usize) -> Result<Vec<TimeLogRecord>> {
        records::list_time_logs(self.kv.as_ref(), self.user_id(), limit)
    }

    pub fn project_time_logs(&self, project_id: &str) -> Result<Vec<TimeLogRecord>> {
        records::project_time_logs(self.kv.as_ref(), self.user_id(), project_id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Debug Logs API
    // ─────────────────────────────────────────────────────────────────────────────

    /// Captures what the 60-minute checkpoint prompt collected.
    pub fn create_debug_log(&mut self, new: NewDebugLog) -> Result<DebugLog> {
        records::create_debug_log(self.kv.as_ref(), self.user_id(), new)
    }

    pub fn append_debug_attempt(&mut self, log_id: &str, attempt: &str) -> Result<DebugLog> {
        records::append_debug_attempt(self.kv.as_ref(), log_id, attempt)
    }

    pub fn resolve_debug_log(&mut self, log_id: &str, solution: &str) -> Result<DebugLog> {
        records::resolve_debug_log(self.kv.as_ref(), log_id, solution)
    }

    pub fn list_debug_logs(&self) -> Result<Vec<DebugLog>> {
        records::list_debug_logs(self.kv.as_ref(), self.user_id())
    }

    pub fn project_debug_logs(&self, project_id: &str) -> Result<Vec<DebugLog>> {
        records::project_debug_logs(self.kv.as_ref(), self.user_id(), project_id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Learning Logs API
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a timed learning interval that ended now.
    pub fn log_learning_session(
        &mut self,
        new: NewLearningLog,
        started_at: DateTime<Utc>,
    ) -> Result<LearningLog> {
        records::create_timed_learning_log(
            self.kv.as_ref(),
            self.user_id(),
            new,
            started_at,
            Utc::now(),
        )
    }

    /// Records learning time entered after the fact.
    pub fn log_manual_learning(
        &mut self,
        new: NewLearningLog,
        duration_minutes: f64,
        date: Option<DateTime<Utc>>,
    ) -> Result<LearningLog> {
        records::create_manual_learning_log(
            self.kv.as_ref(),
            self.user_id(),
            new,
            duration_minutes,
            date,
        )
    }

    pub fn list_learning_logs(&self, limit: usize) -> Result<Vec<LearningLog>> {
        records::list_learning_logs(self.kv.as_ref(), self.user_id(), limit)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Colleague Requests API
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn submit_colleague_request(
        &mut self,
        new: NewColleagueRequest,
    ) -> Result<ColleagueRequest> {
        records::create_colleague_request(self.kv.as_ref(), self.user_id(), new)
    }

    pub fn update_colleague_request(
        &mut self,
        request_id: &str,
        patch: RequestPatch,
    ) -> Result<ColleagueRequest> {
        records::update_colleague_request(self.kv.as_ref(), request_id, patch)
    }

    pub fn record_request_follow_up(&mut self, request_id: &str) -> Result<ColleagueRequest> {
        records::record_request_follow_up(self.kv.as_ref(), request_id)
    }

    pub fn list_colleague_requests(&self) -> Result<Vec<ColleagueRequest>> {
        records::list_colleague_requests(self.kv.as_ref(), self.user_id())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Weekly Reviews API
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn create_weekly_review(&mut self, new: NewWeeklyReview) -> Result<WeeklyReview> {
        records::create_weekly_review(self.kv.as_ref(), self.user_id(), new)
    }

    pub fn list_weekly_reviews(&self, limit: usize) -> Result<Vec<WeeklyReview>> {
        records::list_weekly_reviews(self.kv.as_ref(), self.user_id(), limit)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Analytics API
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn analytics_summary(&self) -> Result<AnalyticsSummary> {
        let projects = self.list_projects()?;
        let time_logs = self.list_time_logs(records::DEFAULT_LIST_LIMIT)?;
        Ok(analytics::summarize(&projects, &time_logs))
    }

    pub fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        let projects = self.list_projects()?;
        Ok(analytics::dashboard_metrics(&projects, Utc::now()))
    }

    pub fn project_insights(&self) -> Result<Vec<Insight>> {
        let projects = self.list_projects()?;
        Ok(analytics::debugging_insights(&projects))
    }
}
