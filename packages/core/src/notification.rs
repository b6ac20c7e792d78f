//! Outbound completion notification document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Job, JobId, JobStatus, Priority};

/// Body posted to the notification destination when a job completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub job_id: JobId,
    pub task_name: String,
    pub status: JobStatus,
    pub priority: Priority,
    pub payload: serde_json::Value,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Job> for Notification {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            task_name: job.task_name.clone(),
            status: job.status,
            priority: job.priority,
            payload: job.payload.clone(),
            completed_at: job.completed_at,
            created_at: job.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_carries_job_fields() {
        let now = Utc::now();
        let job = Job {
            id: JobId(3),
            task_name: "Send Email".into(),
            payload: json!({"to": "a@b.com"}),
            priority: Priority::Medium,
            status: JobStatus::Completed,
            created_at: now,
            updated_at: now,
            completed_at: Some(now),
        };

        let doc = serde_json::to_value(Notification::from(&job)).unwrap();
        assert_eq!(doc["jobId"], json!(3));
        assert_eq!(doc["taskName"], json!("Send Email"));
        assert_eq!(doc["status"], json!("completed"));
        assert_eq!(doc["priority"], json!("Medium"));
        assert_eq!(doc["payload"], json!({"to": "a@b.com"}));
        assert!(doc["completedAt"].is_string());
        assert!(doc.get("updatedAt").is_none());
    }
}
