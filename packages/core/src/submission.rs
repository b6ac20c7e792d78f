//! Client job submissions and their validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Priority;

/// Raw submission as received from a client. Nothing here is trusted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// A submission that passed validation and is ready for insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub task_name: String,
    pub priority: Priority,
    pub payload: Value,
}

/// Every rule a submission broke, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", .details.join("; "))]
pub struct ValidationError {
    pub details: Vec<String>,
}

impl JobSubmission {
    pub fn new(
        task_name: impl Into<String>,
        priority: impl Into<String>,
        payload: Option<Value>,
    ) -> Self {
        Self {
            task_name: Some(task_name.into()),
            priority: Some(priority.into()),
            payload,
        }
    }

    /// Check the submission, collecting all failures rather than stopping
    /// at the first one.
    pub fn validate(self) -> Result<NewJob, ValidationError> {
        let mut details = Vec::new();

        let task_name = self
            .task_name
            .filter(|name| !name.trim().is_empty());
        if task_name.is_none() {
            details.push("taskName is required and cannot be empty".to_string());
        }

        let priority = self.priority.as_deref().and_then(Priority::parse);
        if priority.is_none() {
            details.push("priority must be one of: Low, Medium, High".to_string());
        }

        let payload = match self.payload {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(Value::String(s)) if s.is_empty() => Value::Object(Default::default()),
            Some(Value::String(s)) => {
                if serde_json::from_str::<Value>(&s).is_err() {
                    details.push("payload must be valid JSON".to_string());
                }
                Value::String(s)
            }
            Some(other) => other,
        };

        match (task_name, priority) {
            (Some(task_name), Some(priority)) if details.is_empty() => Ok(NewJob {
                task_name,
                priority,
                payload,
            }),
            _ => Err(ValidationError { details }),
        }
    }
}
