//! Core types shared across all Project Autopilot clients.
//!
//! These types are the lingua franca of the dashboard: the engine, the
//! storage layer and every client (web UI, CLI, tests) use these exact
//! same shapes. Persisted records serialize with serde and are stored as
//! JSON values in the key-value collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AutopilotError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// Session Kind
// ═══════════════════════════════════════════════════════════════════════════════

/// What kind of work an active timer session is tracking.
///
/// Immutable for the lifetime of a session. Building and debugging time
/// roll up into per-project hour totals; learning time is recorded but
/// kept out of project aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Building,
    Debugging,
    Learning,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Building => "building",
            SessionKind::Debugging => "debugging",
            SessionKind::Learning => "learning",
        }
    }

    /// True for kinds whose duration is added to a project hour total.
    pub fn counts_toward_project_hours(self) -> bool {
        matches!(self, SessionKind::Building | SessionKind::Debugging)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Project Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planning,
    Building,
    Debugging,
    Testing,
    Complete,
    Paused,
}

impl ProjectStatus {
    /// A project counts against the active-project limit unless it is
    /// complete or paused.
    pub fn is_active(self) -> bool {
        !matches!(self, ProjectStatus::Complete | ProjectStatus::Paused)
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Where a project is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "n8n")]
    N8n,
    #[serde(rename = "claude-code")]
    ClaudeCode,
    #[serde(rename = "lovable")]
    Lovable,
    #[serde(rename = "other")]
    Other,
}

/// A tracked project.
///
/// `building_hours` and `debugging_hours` are monotone running totals,
/// mutated only by the stop-timer reconciliation path (and the explicit
/// reset-hours maintenance operation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub building_hours: f64,
    #[serde(default)]
    pub debugging_hours: f64,
    #[serde(default)]
    pub progress: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    // Planning-wizard fields, all optional
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub problem_statement: Option<String>,
    #[serde(default)]
    pub target_user: Option<String>,
    #[serde(default)]
    pub mvp_scope: Vec<String>,
    #[serde(default)]
    pub out_of_scope: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub potential_risks: Option<String>,
    #[serde(default)]
    pub mitigation_strategy: Option<String>,
    #[serde(default)]
    pub stuck_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_action: Option<String>,
}

impl Project {
    pub fn total_hours(&self) -> f64 {
        self.building_hours + self.debugging_hours
    }

    /// Fraction of logged time spent debugging, if any time is logged.
    pub fn debugging_share(&self) -> Option<f64> {
        let total = self.total_hours();
        (total > 0.0).then(|| self.debugging_hours / total)
    }
}

/// Input for creating a project (the planning-wizard payload).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub problem_statement: Option<String>,
    #[serde(default)]
    pub target_user: Option<String>,
    #[serde(default)]
    pub mvp_scope: Vec<String>,
    #[serde(default)]
    pub out_of_scope: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub potential_risks: Option<String>,
    #[serde(default)]
    pub mitigation_strategy: Option<String>,
    #[serde(default)]
    pub next_action: Option<String>,
}

/// A partial update applied to a stored project. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<u32>,
    pub building_hours: Option<f64>,
    pub debugging_hours: Option<f64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub estimated_hours: Option<f64>,
    pub stuck_since: Option<DateTime<Utc>>,
    pub next_action: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Time Log Types
// ═══════════════════════════════════════════════════════════════════════════════

/// One persisted building/debugging/learning interval.
///
/// Created open (no `ended_at`) when a timer starts and closed exactly
/// once by the reconciliation path. `ended_at == None` means the session
/// is still open or was abandoned; at most one open record should exist
/// per user in normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLogRecord {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub kind: SessionKind,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Fractional minutes; sub-minute precision is preserved (a 15-second
    /// session is 0.25 minutes, not 0).
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeLogRecord {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Debug Log Types
// ═══════════════════════════════════════════════════════════════════════════════

/// One debugging approach, timestamped when it was logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugAttempt {
    pub attempt: String,
    pub timestamp: DateTime<Utc>,
}

/// A debugging journal entry: what was tried and the current hypothesis.
/// Usually captured from the 60-minute checkpoint prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugLog {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub attempts: Vec<DebugAttempt>,
    #[serde(default)]
    pub hypothesis: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub time_spent_minutes: Option<f64>,
    pub created_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Learning Log Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Ad-hoc learning time, either timed or entered manually after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningLog {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub other_source: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: f64,
    /// True when the duration was supplied by the user instead of timed.
    #[serde(default)]
    pub is_manual: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for a learning-log entry.
#[derive(Debug, Clone, Default)]
pub struct NewLearningLog {
    pub sources: Vec<String>,
    pub other_source: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
}

/// Input for a debugging journal entry. `attempts` are the approaches
/// tried so far, in the order they were tried.
#[derive(Debug, Clone, Default)]
pub struct NewDebugLog {
    pub project_id: String,
    pub error_description: Option<String>,
    pub attempts: Vec<String>,
    pub hypothesis: Option<String>,
    pub time_spent_minutes: Option<f64>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Colleague Request Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "submitted")]
    Submitted,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "dropped")]
    Dropped,
}

/// An automation request submitted by a colleague, optionally promoted
/// into a tracked project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColleagueRequest {
    pub id: String,
    pub user_id: String,
    pub requester_name: String,
    pub requester_email: String,
    #[serde(default)]
    pub problem_statement: Option<String>,
    #[serde(default)]
    pub current_workflow: Option<String>,
    #[serde(default)]
    pub desired_outcome: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub project_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub last_contact_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub follow_up_count: u32,
}

/// Input for a colleague request.
#[derive(Debug, Clone, Default)]
pub struct NewColleagueRequest {
    pub requester_name: String,
    pub requester_email: String,
    pub problem_statement: Option<String>,
    pub current_workflow: Option<String>,
    pub desired_outcome: Option<String>,
}

/// A partial update applied to a stored colleague request.
#[derive(Debug, Clone, Default)]
pub struct RequestPatch {
    pub status: Option<RequestStatus>,
    pub project_id: Option<String>,
    pub last_contact_at: Option<DateTime<Utc>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Weekly Review Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReviewEntry {
    pub project_id: String,
    pub made_progress: bool,
}

/// Input for a weekly review.
#[derive(Debug, Clone)]
pub struct NewWeeklyReview {
    pub week_start: DateTime<Utc>,
    pub projects_reviewed: Vec<ProjectReviewEntry>,
    pub building_hours: f64,
    pub debugging_hours: f64,
    pub completed_count: u32,
    pub insights: Option<String>,
    pub next_week_goal: Option<String>,
}

/// A snapshot of one week's progress across all projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub id: String,
    pub user_id: String,
    pub week_start: DateTime<Utc>,
    #[serde(default)]
    pub projects_reviewed: Vec<ProjectReviewEntry>,
    #[serde(default)]
    pub building_hours: f64,
    #[serde(default)]
    pub debugging_hours: f64,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub insights: Option<String>,
    #[serde(default)]
    pub next_week_goal: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Parses a JSON-encoded record read from the store.
pub(crate) fn decode_record<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|source| AutopilotError::Malformed {
        key: key.to_string(),
        source,
    })
}

/// Serializes a record for storage.
pub(crate) fn encode_record<T: Serialize>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| AutopilotError::Malformed {
        key: key.to_string(),
        source,
    })
}
