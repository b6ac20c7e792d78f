//! Job repository: insert, fetch, filtered listing and status transitions.

use chrono::{DateTime, Utc};
use job_core::{Job, JobFilter, JobId, JobStatus, NewJob, Priority};
use serde::Deserialize;

use crate::{Database, DbError};

/// Repository for job persistence operations.
#[derive(Clone)]
pub struct JobRepository {
    db: Database,
}

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct JobRecord {
    job_id: u64,
    task_name: String,
    payload: String,
    priority: Priority,
    status: JobStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    fn into_job(self) -> Result<Job, DbError> {
        let payload = serde_json::from_str(&self.payload).map_err(|e| {
            DbError::Serialization(format!("payload of job {}: {}", self.job_id, e))
        })?;

        Ok(Job {
            id: JobId(self.job_id),
            task_name: self.task_name,
            payload,
            priority: self.priority,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

/// Allocates the next id and creates the row in one request.
/// Statement 2 holds the created record.
const INSERT_JOB: &str = r#"
LET $seq = (UPSERT job_seq:jobs SET n += 1 RETURN AFTER)[0].n;
LET $now = time::now();
CREATE type::thing('job', $seq) CONTENT {
    job_id: $seq,
    task_name: $task_name,
    payload: $payload,
    priority: $priority,
    status: 'pending',
    created_at: $now,
    updated_at: $now
} RETURN AFTER;
"#;

const INSERT_RESULT: usize = 2;

const SELECT_JOB: &str = "SELECT * FROM type::thing('job', $id)";

/// Compare-and-set: only a pending row moves to running.
const MARK_RUNNING: &str = r#"
UPDATE type::thing('job', $id)
    SET status = 'running', updated_at = time::now()
    WHERE status = 'pending'
    RETURN AFTER;
"#;

/// Compare-and-set: only a running row moves to completed.
/// Statement 1 holds the updated record.
const MARK_COMPLETED: &str = r#"
LET $now = time::now();
UPDATE type::thing('job', $id)
    SET status = 'completed', completed_at = $now, updated_at = $now
    WHERE status = 'running'
    RETURN AFTER;
"#;

impl JobRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new pending job and return it as stored.
    pub async fn insert(&self, new_job: &NewJob) -> Result<Job, DbError> {
        let payload = serde_json::to_string(&new_job.payload)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        let mut response = self
            .db
            .query(INSERT_JOB)
            .bind(("task_name", new_job.task_name.clone()))
            .bind(("payload", payload))
            .bind(("priority", new_job.priority.as_str()))
            .await?
            .check()?;

        let records: Vec<JobRecord> = response.take(INSERT_RESULT)?;

        records
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Query("Failed to create job".into()))?
            .into_job()
    }

    /// Get a job by ID.
    pub async fn get(&self, id: JobId) -> Result<Job, DbError> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Job not found: {}", id)))
    }

    /// Get a job by ID, `None` if it does not exist.
    pub async fn find(&self, id: JobId) -> Result<Option<Job>, DbError> {
        let mut response = self
            .db
            .query(SELECT_JOB)
            .bind(("id", id.0 as i64))
            .await?;

        let records: Vec<JobRecord> = response.take(0)?;

        records.into_iter().next().map(JobRecord::into_job).transpose()
    }

    /// List jobs matching the filter, most recently created first.
    pub async fn list(&self, filter: JobFilter) -> Result<Vec<Job>, DbError> {
        let mut conditions = Vec::new();
        let mut bindings: Vec<(&str, &'static str)> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = $status");
            bindings.push(("status", status.as_str()));
        }

        if let Some(priority) = filter.priority {
            conditions.push("priority = $priority");
            bindings.push(("priority", priority.as_str()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM job {} ORDER BY created_at DESC, job_id DESC",
            where_clause
        );

        let mut result = self.db.query(&query);

        for (name, value) in bindings {
            result = result.bind((name.to_string(), value));
        }

        let mut response = result.await?;
        let records: Vec<JobRecord> = response.take(0)?;

        records.into_iter().map(JobRecord::into_job).collect()
    }

    /// Move a job one step forward if it is still in `from`.
    ///
    /// Returns `Ok(None)` when nothing was updated, either because the job
    /// does not exist or because its status was no longer `from`.
    pub async fn transition(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, DbError> {
        if from.next() != Some(to) {
            return Err(DbError::Query(format!(
                "Illegal status transition {} -> {}",
                from, to
            )));
        }

        let (query, slot) = match to {
            JobStatus::Running => (MARK_RUNNING, 0),
            _ => (MARK_COMPLETED, 1),
        };

        let mut response = self
            .db
            .query(query)
            .bind(("id", id.0 as i64))
            .await?
            .check()?;

        let records: Vec<JobRecord> = response.take(slot)?;

        match records.into_iter().next() {
            Some(record) => {
                let job = record.into_job()?;
                tracing::debug!("Job {} {} -> {}", id, from, to);
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }

    /// Number of jobs currently stored.
    pub async fn count(&self) -> Result<u64, DbError> {
        let mut response = self
            .db
            .query("SELECT count() AS count FROM job GROUP ALL")
            .await?;

        #[derive(Deserialize)]
        struct CountResult {
            count: i64,
        }

        let counts: Vec<CountResult> = response.take(0)?;

        Ok(counts.first().map_or(0, |c| c.count.max(0) as u64))
    }
}
