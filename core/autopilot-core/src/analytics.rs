//! Aggregate metrics over projects and time logs.
//!
//! Pure functions over already-fetched records; the engine supplies the
//! data. Percentages are whole numbers and hour totals are rounded to one
//! decimal, matching what the dashboard tiles display.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Project, SessionKind, TimeLogRecord};

/// Rolled-up numbers for the analytics page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Building + debugging hours across all projects, one decimal.
    pub total_hours: f64,
    /// Percent of logged time spent building.
    pub building_ratio: u32,
    /// Percent of logged time spent debugging.
    pub debugging_ratio: u32,
    /// Percent of projects marked complete.
    pub completion_rate: u32,
    /// Mean length of a closed debugging session, in minutes.
    pub avg_debug_session_minutes: f64,
}

/// Headline numbers for the dashboard overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub active_projects: u32,
    pub building_hours: f64,
    pub debugging_hours: f64,
    pub completed_this_month: u32,
}

/// A per-project warning surfaced on the overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub project_id: String,
    pub title: String,
    pub detail: String,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(part: f64, whole: f64) -> u32 {
    if whole > 0.0 {
        (part / whole * 100.0).round() as u32
    } else {
        0
    }
}

pub fn summarize(projects: &[Project], time_logs: &[TimeLogRecord]) -> AnalyticsSummary {
    let building: f64 = projects.iter().map(|p| p.building_hours).sum();
    let debugging: f64 = projects.iter().map(|p| p.debugging_hours).sum();
    let total = building + debugging;

    let completed = projects
        .iter()
        .filter(|p| p.status == crate::types::ProjectStatus::Complete)
        .count() as f64;

    let debug_durations: Vec<f64> = time_logs
        .iter()
        .filter(|log| log.kind == SessionKind::Debugging)
        .filter_map(|log| log.duration_minutes)
        .collect();
    let avg_debug_session_minutes = if debug_durations.is_empty() {
        0.0
    } else {
        round_one_decimal(debug_durations.iter().sum::<f64>() / debug_durations.len() as f64)
    };

    AnalyticsSummary {
        total_hours: round_one_decimal(total),
        building_ratio: percent(building, total),
        debugging_ratio: percent(debugging, total),
        completion_rate: percent(completed, projects.len() as f64),
        avg_debug_session_minutes,
    }
}

pub fn dashboard_metrics(projects: &[Project], now: DateTime<Utc>) -> DashboardMetrics {
    let completed_this_month = projects
        .iter()
        .filter_map(|p| p.completed_at)
        .filter(|done| done.year() == now.year() && done.month() == now.month())
        .count() as u32;

    DashboardMetrics {
        active_projects: projects.iter().filter(|p| p.status.is_active()).count() as u32,
        building_hours: projects.iter().map(|p| p.building_hours).sum(),
        debugging_hours: projects.iter().map(|p| p.debugging_hours).sum(),
        completed_this_month,
    }
}

/// Share of logged time above which a project is flagged as
/// debugging-heavy.
const DEBUGGING_SHARE_ALERT: f64 = 0.6;

/// Flags projects whose logged time is dominated by debugging.
pub fn debugging_insights(projects: &[Project]) -> Vec<Insight> {
    projects
        .iter()
        .filter_map(|project| {
            let share = project.debugging_share()?;
            (share > DEBUGGING_SHARE_ALERT).then(|| Insight {
                project_id: project.id.clone(),
                title: "Debugging time elevated".to_string(),
                detail: format!(
                    "{}% of {} time spent debugging ({:.1}h) vs. building ({:.1}h)",
                    (share * 100.0).round() as u32,
                    project.name,
                    project.debugging_hours,
                    project.building_hours,
                ),
            })
        })
        .collect()
}
