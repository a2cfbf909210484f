//! Typed record operations over the key-value store.
//!
//! Key layout:
//!
//! ```text
//! project:{id}              project data (JSON)
//! user:{uid}:projects       set of project ids
//! timelog:{id}              time log data (JSON)
//! user:{uid}:timelogs       sorted set of time log ids, scored by start time
//! debuglog:{id}             debug log data (JSON)
//! user:{uid}:debuglogs      set of debug log ids
//! learninglog:{id}          learning log data (JSON)
//! user:{uid}:learninglogs   sorted set of learning log ids, scored by start time
//! request:{id}              colleague request data (JSON)
//! user:{uid}:requests       set of request ids
//! review:{id}               weekly review data (JSON)
//! user:{uid}:reviews        sorted set of review ids, scored by week start
//! ```
//!
//! Ids are ULIDs with a type prefix (`proj_`, `time_`, ...) so a bare id
//! names its record type. Listing operations skip dangling index entries
//! rather than failing the whole read.

use chrono::{DateTime, Utc};

use crate::error::{AutopilotError, Result};
use crate::types::{
    decode_record, encode_record, ColleagueRequest, DebugAttempt, DebugLog, LearningLog,
    NewColleagueRequest, NewDebugLog, NewLearningLog, NewProject, NewWeeklyReview, Project,
    ProjectPatch, RequestPatch, RequestStatus, SessionKind, TimeLogRecord, WeeklyReview,
};

use super::kv::KvStore;

/// Default number of entries returned by time-ordered listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, ulid::Ulid::new())
}

fn project_key(id: &str) -> String {
    format!("project:{id}")
}

fn user_projects_key(user_id: &str) -> String {
    format!("user:{user_id}:projects")
}

fn time_log_key(id: &str) -> String {
    format!("timelog:{id}")
}

fn user_time_logs_key(user_id: &str) -> String {
    format!("user:{user_id}:timelogs")
}

fn debug_log_key(id: &str) -> String {
    format!("debuglog:{id}")
}

fn user_debug_logs_key(user_id: &str) -> String {
    format!("user:{user_id}:debuglogs")
}

fn learning_log_key(id: &str) -> String {
    format!("learninglog:{id}")
}

fn user_learning_logs_key(user_id: &str) -> String {
    format!("user:{user_id}:learninglogs")
}

fn request_key(id: &str) -> String {
    format!("request:{id}")
}

fn user_requests_key(user_id: &str) -> String {
    format!("user:{user_id}:requests")
}

fn review_key(id: &str) -> String {
    format!("review:{id}")
}

fn user_reviews_key(user_id: &str) -> String {
    format!("user:{user_id}:reviews")
}

fn read_json<T: serde::de::DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match kv.get(key)? {
        Some(raw) => Ok(Some(decode_record(key, &raw)?)),
        None => Ok(None),
    }
}

fn write_json<T: serde::Serialize>(kv: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    kv.set(key, &encode_record(key, value)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

pub fn create_project(kv: &dyn KvStore, user_id: &str, new: NewProject) -> Result<Project> {
    let now = Utc::now();
    let project = Project {
        id: new_id("proj"),
        user_id: user_id.to_string(),
        name: new.name,
        status: new.status,
        priority: new.priority,
        building_hours: 0.0,
        debugging_hours: 0.0,
        progress: 0,
        created_at: now,
        updated_at: now,
        completed_at: None,
        description: new.description,
        problem_statement: new.problem_statement,
        target_user: new.target_user,
        mvp_scope: new.mvp_scope,
        out_of_scope: new.out_of_scope,
        platform: new.platform,
        estimated_hours: new.estimated_hours,
        potential_risks: new.potential_risks,
        mitigation_strategy: new.mitigation_strategy,
        stuck_since: None,
        next_action: new.next_action,
    };

    write_json(kv, &project_key(&project.id), &project)?;
    kv.sadd(&user_projects_key(user_id), &project.id)?;
    Ok(project)
}

pub fn get_project(kv: &dyn KvStore, project_id: &str) -> Result<Option<Project>> {
    read_json(kv, &project_key(project_id))
}

/// Lists the user's projects, most recently created first.
pub fn list_projects(kv: &dyn KvStore, user_id: &str) -> Result<Vec<Project>> {
    let ids = kv.smembers(&user_projects_key(user_id))?;
    let mut projects = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(project) = get_project(kv, &id)? {
            projects.push(project);
        }
    }
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(projects)
}

pub fn update_project(kv: &dyn KvStore, project_id: &str, patch: ProjectPatch) -> Result<Project> {
    let mut project = get_project(kv, project_id)?
        .ok_or_else(|| AutopilotError::ProjectNotFound(project_id.to_string()))?;

    if let Some(name) = patch.name {
        project.name = name;
    }
    if let Some(status) = patch.status {
        project.status = status;
    }
    if let Some(priority) = patch.priority {
        project.priority = priority;
    }
    if let Some(progress) = patch.progress {
        project.progress = progress.min(100);
    }
    if let Some(hours) = patch.building_hours {
        project.building_hours = hours;
    }
    if let Some(hours) = patch.debugging_hours {
        project.debugging_hours = hours;
    }
    if let Some(completed_at) = patch.completed_at {
        project.completed_at = Some(completed_at);
    }
    if let Some(description) = patch.description {
        project.description = Some(description);
    }
    if let Some(estimated) = patch.estimated_hours {
        project.estimated_hours = Some(estimated);
    }
    if let Some(stuck_since) = patch.stuck_since {
        project.stuck_since = Some(stuck_since);
    }
    if let Some(next_action) = patch.next_action {
        project.next_action = Some(next_action);
    }
    project.updated_at = Utc::now();

    write_json(kv, &project_key(project_id), &project)?;
    Ok(project)
}

pub fn delete_project(kv: &dyn KvStore, user_id: &str, project_id: &str) -> Result<()> {
    kv.del(&project_key(project_id))?;
    kv.srem(&user_projects_key(user_id), project_id)
}

pub fn active_project_count(kv: &dyn KvStore, user_id: &str) -> Result<u32> {
    let projects = list_projects(kv, user_id)?;
    Ok(projects.iter().filter(|p| p.status.is_active()).count() as u32)
}

/// Adds `hours_delta` to the project's hour total for `kind` via
/// read-modify-write.
///
/// Returns `None` when the project no longer exists (e.g. deleted while a
/// timer was running); the caller decides whether that matters.
///
/// Single-writer assumption: one operator, one active timer, so no
/// concurrent mutation of the aggregate. A multi-writer adaptation needs
/// an atomic increment at the storage layer instead.
pub fn add_project_hours(
    kv: &dyn KvStore,
    project_id: &str,
    kind: SessionKind,
    hours_delta: f64,
) -> Result<Option<Project>> {
    let Some(project) = get_project(kv, project_id)? else {
        return Ok(None);
    };

    let patch = match kind {
        SessionKind::Building => ProjectPatch {
            building_hours: Some(project.building_hours + hours_delta),
            ..ProjectPatch::default()
        },
        SessionKind::Debugging => ProjectPatch {
            debugging_hours: Some(project.debugging_hours + hours_delta),
            ..ProjectPatch::default()
        },
        SessionKind::Learning => return Ok(Some(project)),
    };

    update_project(kv, project_id, patch).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Time Logs
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the open record that anchors a new timer session.
pub fn create_open_time_log(
    kv: &dyn KvStore,
    user_id: &str,
    project_id: &str,
    kind: SessionKind,
    started_at: DateTime<Utc>,
) -> Result<TimeLogRecord> {
    let record = TimeLogRecord {
        id: new_id("time"),
        project_id: project_id.to_string(),
        user_id: user_id.to_string(),
        kind,
        started_at,
        ended_at: None,
        duration_minutes: None,
        notes: None,
        created_at: started_at,
    };

    write_json(kv, &time_log_key(&record.id), &record)?;
    kv.zadd(
        &user_time_logs_key(user_id),
        started_at.timestamp_millis(),
        &record.id,
    )?;
    Ok(record)
}

pub fn get_time_log(kv: &dyn KvStore, record_id: &str) -> Result<Option<TimeLogRecord>> {
    read_json(kv, &time_log_key(record_id))
}

/// Closes a time log with its final duration.
///
/// Closing an already-closed record overwrites `ended_at` and
/// `duration_minutes`; the reconciliation path relies on that to make
/// stop retries converge on the duration of the successful attempt.
pub fn close_time_log(
    kv: &dyn KvStore,
    record_id: &str,
    ended_at: DateTime<Utc>,
    duration_minutes: f64,
) -> Result<TimeLogRecord> {
    let mut record = get_time_log(kv, record_id)?
        .ok_or_else(|| AutopilotError::TimeLogNotFound(record_id.to_string()))?;

    record.ended_at = Some(ended_at);
    record.duration_minutes = Some(duration_minutes);
    write_json(kv, &time_log_key(record_id), &record)?;
    Ok(record)
}

/// Lists the user's time logs, most recent start first.
pub fn list_time_logs(kv: &dyn KvStore, user_id: &str, limit: usize) -> Result<Vec<TimeLogRecord>> {
    let ids = kv.zrange_rev(&user_time_logs_key(user_id), limit)?;
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(record) = get_time_log(kv, &id)? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn project_time_logs(
    kv: &dyn KvStore,
    user_id: &str,
    project_id: &str,
) -> Result<Vec<TimeLogRecord>> {
    let mut records = list_time_logs(kv, user_id, DEFAULT_LIST_LIMIT)?;
    records.retain(|r| r.project_id == project_id);
    Ok(records)
}

// ─────────────────────────────────────────────────────────────────────────────
// Debug Logs
// ─────────────────────────────────────────────────────────────────────────────

pub fn create_debug_log(kv: &dyn KvStore, user_id: &str, new: NewDebugLog) -> Result<DebugLog> {
    let now = Utc::now();
    let log = DebugLog {
        id: new_id("debug"),
        project_id: new.project_id,
        user_id: user_id.to_string(),
        error_description: new.error_description,
        attempts: new
            .attempts
            .into_iter()
            .map(|attempt| DebugAttempt {
                attempt,
                timestamp: now,
            })
            .collect(),
        hypothesis: new.hypothesis,
        solution: None,
        time_spent_minutes: new.time_spent_minutes,
        created_at: now,
    };

    write_json(kv, &debug_log_key(&log.id), &log)?;
    kv.sadd(&user_debug_logs_key(user_id), &log.id)?;
    Ok(log)
}

pub fn get_debug_log(kv: &dyn KvStore, log_id: &str) -> Result<Option<DebugLog>> {
    read_json(kv, &debug_log_key(log_id))
}

/// Appends another attempted approach to an existing debug log.
pub fn append_debug_attempt(kv: &dyn KvStore, log_id: &str, attempt: &str) -> Result<DebugLog> {
    let mut log = get_debug_log(kv, log_id)?
        .ok_or_else(|| AutopilotError::DebugLogNotFound(log_id.to_string()))?;

    log.attempts.push(DebugAttempt {
        attempt: attempt.to_string(),
        timestamp: Utc::now(),
    });
    write_json(kv, &debug_log_key(log_id), &log)?;
    Ok(log)
}

/// Records the solution that closed out a debugging thread.
pub fn resolve_debug_log(kv: &dyn KvStore, log_id: &str, solution: &str) -> Result<DebugLog> {
    let mut log = get_debug_log(kv, log_id)?
        .ok_or_else(|| AutopilotError::DebugLogNotFound(log_id.to_string()))?;

    log.solution = Some(solution.to_string());
    write_json(kv, &debug_log_key(log_id), &log)?;
    Ok(log)
}

/// Lists the user's debug logs, newest first.
pub fn list_debug_logs(kv: &dyn KvStore, user_id: &str) -> Result<Vec<DebugLog>> {
    let ids = kv.smembers(&user_debug_logs_key(user_id))?;
    let mut logs = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(log) = get_debug_log(kv, &id)? {
            logs.push(log);
        }
    }
    logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(logs)
}

pub fn project_debug_logs(
    kv: &dyn KvStore,
    user_id: &str,
    project_id: &str,
) -> Result<Vec<DebugLog>> {
    let mut logs = list_debug_logs(kv, user_id)?;
    logs.retain(|l| l.project_id == project_id);
    Ok(logs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Learning Logs
// ─────────────────────────────────────────────────────────────────────────────

/// Records a timed learning interval. Duration is derived from the
/// wall-clock delta, rounded to whole minutes.
pub fn create_timed_learning_log(
    kv: &dyn KvStore,
    user_id: &str,
    new: NewLearningLog,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
) -> Result<LearningLog> {
    let elapsed = ended_at.signed_duration_since(started_at);
    let duration_minutes = (elapsed.num_seconds().max(0) as f64 / 60.0).round();
    store_learning_log(kv, user_id, new, started_at, Some(ended_at), duration_minutes, false)
}

/// Records learning time entered after the fact, with a user-supplied
/// duration and an optional backdated start.
pub fn create_manual_learning_log(
    kv: &dyn KvStore,
    user_id: &str,
    new: NewLearningLog,
    duration_minutes: f64,
    date: Option<DateTime<Utc>>,
) -> Result<LearningLog> {
    let started_at = date.unwrap_or_else(Utc::now);
    store_learning_log(kv, user_id, new, started_at, None, duration_minutes, true)
}

fn store_learning_log(
    kv: &dyn KvStore,
    user_id: &str,
    new: NewLearningLog,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration_minutes: f64,
    is_manual: bool,
) -> Result<LearningLog> {
    let log = LearningLog {
        id: new_id("learn"),
        user_id: user_id.to_string(),
        sources: new.sources,
        other_source: new.other_source,
        topic: new.topic,
        description: new.description,
        started_at,
        ended_at,
        duration_minutes,
        is_manual,
        created_at: Utc::now(),
    };

    write_json(kv, &learning_log_key(&log.id), &log)?;
    kv.zadd(
        &user_learning_logs_key(user_id),
        started_at.timestamp_millis(),
        &log.id,
    )?;
    Ok(log)
}

pub fn get_learning_log(kv: &dyn KvStore, log_id: &str) -> Result<Option<LearningLog>> {
    read_json(kv, &learning_log_key(log_id))
}

/// Lists the user's learning logs, most recent start first.
pub fn list_learning_logs(
    kv: &dyn KvStore,
    user_id: &str,
    limit: usize,
) -> Result<Vec<LearningLog>> {
    let ids = kv.zrange_rev(&user_learning_logs_key(user_id), limit)?;
    let mut logs = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(log) = get_learning_log(kv, &id)? {
            logs.push(log);
        }
    }
    Ok(logs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Colleague Requests
// ─────────────────────────────────────────────────────────────────────────────

pub fn create_colleague_request(
    kv: &dyn KvStore,
    user_id: &str,
    new: NewColleagueRequest,
) -> Result<ColleagueRequest> {
    let request = ColleagueRequest {
        id: new_id("req"),
        user_id: user_id.to_string(),
        requester_name: new.requester_name,
        requester_email: new.requester_email,
        problem_statement: new.problem_statement,
        current_workflow: new.current_workflow,
        desired_outcome: new.desired_outcome,
        status: RequestStatus::Submitted,
        project_id: None,
        submitted_at: Utc::now(),
        last_contact_at: None,
        follow_up_count: 0,
    };

    write_json(kv, &request_key(&request.id), &request)?;
    kv.sadd(&user_requests_key(user_id), &request.id)?;
    Ok(request)
}

pub fn get_colleague_request(kv: &dyn KvStore, request_id: &str) -> Result<Option<ColleagueRequest>> {
    read_json(kv, &request_key(request_id))
}

pub fn update_colleague_request(
    kv: &dyn KvStore,
    request_id: &str,
    patch: RequestPatch,
) -> Result<ColleagueRequest> {
    let mut request = get_colleague_request(kv, request_id)?
        .ok_or_else(|| AutopilotError::RequestNotFound(request_id.to_string()))?;

    if let Some(status) = patch.status {
        request.status = status;
    }
    if let Some(project_id) = patch.project_id {
        request.project_id = Some(project_id);
    }
    if let Some(last_contact_at) = patch.last_contact_at {
        request.last_contact_at = Some(last_contact_at);
    }

    write_json(kv, &request_key(request_id), &request)?;
    Ok(request)
}

/// Bumps the follow-up counter after pinging the requester.
pub fn record_request_follow_up(kv: &dyn KvStore, request_id: &str) -> Result<ColleagueRequest> {
    let mut request = get_colleague_request(kv, request_id)?
        .ok_or_else(|| AutopilotError::RequestNotFound(request_id.to_string()))?;

    request.follow_up_count += 1;
    request.last_contact_at = Some(Utc::now());
    write_json(kv, &request_key(request_id), &request)?;
    Ok(request)
}

/// Lists the user's colleague requests, newest submission first.
pub fn list_colleague_requests(kv: &dyn KvStore, user_id: &str) -> Result<Vec<ColleagueRequest>> {
    let ids = kv.smembers(&user_requests_key(user_id))?;
    let mut requests = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(request) = get_colleague_request(kv, &id)? {
            requests.push(request);
        }
    }
    requests.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(requests)
}

// ─────────────────────────────────────────────────────────────────────────────
// Weekly Reviews
// ─────────────────────────────────────────────────────────────────────────────

pub fn create_weekly_review(
    kv: &dyn KvStore,
    user_id: &str,
    new: NewWeeklyReview,
) -> Result<WeeklyReview> {
    let review = WeeklyReview {
        id: new_id("review"),
        user_id: user_id.to_string(),
        week_start: new.week_start,
        projects_reviewed: new.projects_reviewed,
        building_hours: new.building_hours,
        debugging_hours: new.debugging_hours,
        completed_count: new.completed_count,
        insights: new.insights,
        next_week_goal: new.next_week_goal,
        created_at: Utc::now(),
    };

    write_json(kv, &review_key(&review.id), &review)?;
    kv.zadd(
        &user_reviews_key(user_id),
        new.week_start.timestamp_millis(),
        &review.id,
    )?;
    Ok(review)
}

pub fn get_weekly_review(kv: &dyn KvStore, review_id: &str) -> Result<Option<WeeklyReview>> {
    read_json(kv, &review_key(review_id))
}

/// Lists the user's weekly reviews, most recent week first.
pub fn list_weekly_reviews(
    kv: &dyn KvStore,
    user_id: &str,
    limit: usize,
) -> Result<Vec<WeeklyReview>> {
    let ids = kv.zrange_rev(&user_reviews_key(user_id), limit)?;
    let mut reviews = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(review) = get_weekly_review(kv, &id)? {
            reviews.push(review);
        }
    }
    Ok(reviews)
}

// ─────────────────────────────────────────────────────────────────────────────
// Maintenance
// ─────────────────────────────────────────────────────────────────────────────

/// Deletes every record and index belonging to `user_id`. There is no
/// undo.
pub fn clear_user_data(kv: &dyn KvStore, user_id: &str) -> Result<()> {
    for id in kv.smembers(&user_projects_key(user_id))? {
        kv.del(&project_key(&id))?;
    }
    for id in kv.zrange_rev(&user_time_logs_key(user_id), usize::MAX)? {
        kv.del(&time_log_key(&id))?;
    }
    for id in kv.smembers(&user_debug_logs_key(user_id))? {
        kv.del(&debug_log_key(&id))?;
    }
    for id in kv.zrange_rev(&user_learning_logs_key(user_id), usize::MAX)? {
        kv.del(&learning_log_key(&id))?;
    }
    for id in kv.smembers(&user_requests_key(user_id))? {
        kv.del(&request_key(&id))?;
    }
    for id in kv.zrange_rev(&user_reviews_key(user_id), usize::MAX)? {
        kv.del(&review_key(&id))?;
    }

    for key in [
        user_projects_key(user_id),
        user_time_logs_key(user_id),
        user_debug_logs_key(user_id),
        user_learning_logs_key(user_id),
        user_requests_key(user_id),
        user_reviews_key(user_id),
    ] {
        kv.del(&key)?;
    }

    tracing::info!(user_id, "cleared all tracked data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryKv;

    fn sample_project(kv: &MemoryKv) -> Project {
        create_project(
            kv,
            "u1",
            NewProject {
                name: "invoice bot".to_string(),
                ..NewProject::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_list_projects() {
        let kv = MemoryKv::new();
        let project = sample_project(&kv);
        assert!(project.id.starts_with("proj_"));
        assert_eq!(project.building_hours, 0.0);

        let listed = list_projects(&kv, "u1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, project.id);
    }

    #[test]
    fn test_update_project_applies_patch_fields_only() {
        let kv = MemoryKv::new();
        let project = sample_project(&kv);

        let updated = update_project(
            &kv,
            &project.id,
            ProjectPatch {
                progress: Some(40),
                next_action: Some("wire up webhook".to_string()),
                ..ProjectPatch::default()
            },
        )
        .unwrap();

        assert_eq!(updated.progress, 40);
        assert_eq!(updated.next_action.as_deref(), Some("wire up webhook"));
        assert_eq!(updated.name, "invoice bot");
    }

    #[test]
    fn test_update_missing_project_errors() {
        let kv = MemoryKv::new();
        let err = update_project(&kv, "proj_missing", ProjectPatch::default()).unwrap_err();
        assert!(matches!(err, AutopilotError::ProjectNotFound(_)));
    }

    #[test]
    fn test_delete_project_removes_value_and_index() {
        let kv = MemoryKv::new();
        let project = sample_project(&kv);
        delete_project(&kv, "u1", &project.id).unwrap();
        assert!(get_project(&kv, &project.id).unwrap().is_none());
        assert!(list_projects(&kv, "u1").unwrap().is_empty());
    }

    #[test]
    fn test_add_project_hours_by_kind() {
        let kv = MemoryKv::new();
        let project = sample_project(&kv);

        add_project_hours(&kv, &project.id, SessionKind::Building, 1.5).unwrap();
        add_project_hours(&kv, &project.id, SessionKind::Debugging, 0.25).unwrap();
        let project = get_project(&kv, &project.id).unwrap().unwrap();
        assert_eq!(project.building_hours, 1.5);
        assert_eq!(project.debugging_hours, 0.25);
    }

    #[test]
    fn test_add_project_hours_learning_is_a_no_op() {
        let kv = MemoryKv::new();
        let project = sample_project(&kv);
        add_project_hours(&kv, &project.id, SessionKind::Learning, 2.0).unwrap();
        let project = get_project(&kv, &project.id).unwrap().unwrap();
        assert_eq!(project.total_hours(), 0.0);
    }

    #[test]
    fn test_add_project_hours_missing_project_returns_none() {
        let kv = MemoryKv::new();
        let result = add_project_hours(&kv, "proj_gone", SessionKind::Building, 1.0).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_time_log_open_close_cycle() {
        let kv = MemoryKv::new();
        let started = Utc::now();
        let record = create_open_time_log(&kv, "u1", "proj_a", SessionKind::Debugging, started)
            .unwrap();
        assert!(record.is_open());

        let closed = close_time_log(&kv, &record.id, started, 61.67).unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.duration_minutes, Some(61.67));
    }

    #[test]
    fn test_list_time_logs_newest_first() {
        let kv = MemoryKv::new();
        let base = Utc::now();
        let older = create_open_time_log(&kv, "u1", "p", SessionKind::Building, base).unwrap();
        let newer = create_open_time_log(
            &kv,
            "u1",
            "p",
            SessionKind::Building,
            base + chrono::Duration::seconds(60),
        )
        .unwrap();

        let listed = list_time_logs(&kv, "u1", 10).unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[test]
    fn test_debug_log_attempt_append() {
        let kv = MemoryKv::new();
        let log = create_debug_log(
            &kv,
            "u1",
            NewDebugLog {
                project_id: "proj_a".to_string(),
                attempts: vec!["checked env vars".to_string()],
                hypothesis: Some("stale token".to_string()),
                ..NewDebugLog::default()
            },
        )
        .unwrap();

        let log = append_debug_attempt(&kv, &log.id, "rotated the token").unwrap();
        assert_eq!(log.attempts.len(), 2);
        assert_eq!(log.attempts[1].attempt, "rotated the token");
    }

    #[test]
    fn test_timed_learning_log_rounds_to_whole_minutes() {
        let kv = MemoryKv::new();
        let started = Utc::now();
        let ended = started + chrono::Duration::seconds(170);
        let log = create_timed_learning_log(&kv, "u1", NewLearningLog::default(), started, ended)
            .unwrap();
        assert_eq!(log.duration_minutes, 3.0);
        assert!(!log.is_manual);
    }

    #[test]
    fn test_manual_learning_log_keeps_given_duration() {
        let kv = MemoryKv::new();
        let log = create_manual_learning_log(
            &kv,
            "u1",
            NewLearningLog {
                topic: Some("webhooks".to_string()),
                ..NewLearningLog::default()
            },
            45.0,
            None,
        )
        .unwrap();
        assert_eq!(log.duration_minutes, 45.0);
        assert!(log.is_manual);
        assert!(log.ended_at.is_none());
    }

    #[test]
    fn test_clear_user_data_removes_records_and_indexes() {
        let kv = MemoryKv::new();
        let project = sample_project(&kv);
        let record =
            create_open_time_log(&kv, "u1", &project.id, SessionKind::Building, Utc::now())
                .unwrap();

        clear_user_data(&kv, "u1").unwrap();
        assert!(get_project(&kv, &project.id).unwrap().is_none());
        assert!(get_time_log(&kv, &record.id).unwrap().is_none());
        assert!(list_projects(&kv, "u1").unwrap().is_empty());
        assert!(list_time_logs(&kv, "u1", 10).unwrap().is_empty());
    }

    #[test]
    fn test_request_follow_up_increments() {
        let kv = MemoryKv::new();
        let request = create_colleague_request(
            &kv,
            "u1",
            NewColleagueRequest {
                requester_name: "Sam".to_string(),
                requester_email: "sam@example.com".to_string(),
                ..NewColleagueRequest::default()
            },
        )
        .unwrap();
        assert_eq!(request.status, RequestStatus::Submitted);

        let request = record_request_follow_up(&kv, &request.id).unwrap();
        assert_eq!(request.follow_up_count, 1);
        assert!(request.last_contact_at.is_some());
    }
}
