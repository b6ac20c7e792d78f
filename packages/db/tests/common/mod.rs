use job_core::{JobSubmission, NewJob};
use serde_json::Value;

use db::{DbConfig, DbError, JobRepository};

/// Fresh in-memory store per test.
pub async fn setup_repo() -> Result<JobRepository, DbError> {
    db::init(DbConfig::memory()).await
}

pub fn new_job(task_name: &str, priority: &str, payload: Value) -> NewJob {
    JobSubmission::new(task_name, priority, Some(payload))
        .validate()
        .expect("valid submission")
}
