//! Error types for autopilot-core operations.
//!
//! Every storage-facing failure is caught at the engine/reconciliation
//! boundary and returned as a typed variant; nothing here is fatal to the
//! process, and no error path discards tracked session time.

use thiserror::Error;

/// All errors that can occur in autopilot-core operations.
#[derive(Debug, Error)]
pub enum AutopilotError {
    // ─────────────────────────────────────────────────────────────────────
    // Timer Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("A timer is already running for project {project_id}: stop it first")]
    AlreadyRunning { project_id: String },

    #[error("A stop attempt is already in flight")]
    AlreadyStopping,

    #[error("No timer is running")]
    NotRunning,

    #[error("Extended mode only applies to an active debugging session")]
    NotDebugging,

    // ─────────────────────────────────────────────────────────────────────
    // Record Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Time log not found: {0}")]
    TimeLogNotFound(String),

    #[error("Debug log not found: {0}")]
    DebugLogNotFound(String),

    #[error("Colleague request not found: {0}")]
    RequestNotFound(String),

    #[error("Maximum {0} active projects allowed: pause or complete a project first")]
    ProjectLimitReached(u32),

    // ─────────────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Storage error: {context}: {details}")]
    Storage { context: String, details: String },

    #[error("Stored record malformed: {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AutopilotError {
    /// Shorthand for a storage-backend failure with context.
    pub fn storage(context: impl Into<String>, details: impl Into<String>) -> Self {
        AutopilotError::Storage {
            context: context.into(),
            details: details.into(),
        }
    }

    /// True for failures of the storage collaborator itself, the class of
    /// error for which a stop retry is always safe.
    pub fn is_storage(&self) -> bool {
        matches!(self, AutopilotError::Storage { .. })
    }
}

/// Convenience type alias for Results using AutopilotError.
pub type Result<T> = std::result::Result<T, AutopilotError>;
