//! Engine configuration.
//!
//! Production values live in the `Default` impls; tests and demo clients
//! substitute smaller thresholds. The policy shape is identical either
//! way - only the constants move.

use serde::{Deserialize, Serialize};

/// Elapsed-time boundaries, in seconds, at which the nudge policy fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NudgeThresholds {
    /// Debugging checkpoint: prompt for attempts + hypothesis. 60 minutes.
    pub debugging_checkpoint_secs: u64,
    /// Debugging hard cutoff: notify and stop the session. 90 minutes.
    pub debugging_cutoff_secs: u64,
    /// Building break prompt. 120 minutes.
    pub building_break_secs: u64,
}

impl Default for NudgeThresholds {
    fn default() -> Self {
        Self {
            debugging_checkpoint_secs: 3600,
            debugging_cutoff_secs: 5400,
            building_break_secs: 7200,
        }
    }
}

/// Configuration for an [`AutopilotEngine`](crate::engine::AutopilotEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Owner of every record the engine reads and writes. Single-operator
    /// deployment; the authenticating client supplies the real id.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub thresholds: NudgeThresholds,
    /// How many non-complete, non-paused projects may exist at once.
    #[serde(default = "default_project_limit")]
    pub active_project_limit: u32,
}

fn default_user_id() -> String {
    "local-operator".to_string()
}

fn default_project_limit() -> u32 {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            thresholds: NudgeThresholds::default(),
            active_project_limit: default_project_limit(),
        }
    }
}
