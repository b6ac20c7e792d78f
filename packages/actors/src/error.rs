//! Engine error taxonomy.

use db::DbError;
use job_core::{JobId, JobStatus, ValidationError};
use thiserror::Error;

/// Errors surfaced to callers of the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// Execute was requested for a job that is no longer pending.
    #[error("{}", invalid_state_message(.status))]
    InvalidState { job_id: JobId, status: JobStatus },

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("Actor error: {0}")]
    Actor(String),
}

fn invalid_state_message(status: &JobStatus) -> &'static str {
    match status {
        JobStatus::Running => "Job is already running",
        JobStatus::Completed => "Job has already been completed",
        JobStatus::Pending => "Job is not running",
    }
}
