use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
///
/// Per-post publish failures are deliberately *not* represented here — they
/// are caught inside the executor and recorded as outcome lines, never
/// propagated as errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Input rejected before any state mutation (bad time format, missing
    /// community, non-positive counts).
    #[error("Validation error: {0}")]
    Validation(String),

    /// No task with the given ID exists in the store.
    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    /// A runtime-config field failed to parse or normalize.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
