//! Job endpoints.

use actors::Engine;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use job_core::{Job, JobFilter, JobId, JobStatus, JobSubmission, Priority};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::{engine_error_to_response, not_found, validation_failed};

/// Query parameters for `GET /jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub count: usize,
    pub jobs: Vec<Job>,
}

/// Interpret one filter parameter.
///
/// Empty or absent means "no filter" (`Some(None)`). A value outside the
/// enumeration can never match, which is reported as `None`.
fn filter_param<T>(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<Option<T>> {
    match raw.filter(|s| !s.is_empty()) {
        None => Some(None),
        Some(value) => parse(value).map(Some),
    }
}

/// `POST /jobs`
pub async fn create_job(
    State(engine): State<Engine>,
    body: Result<Json<JobSubmission>, JsonRejection>,
) -> Response {
    let submission = match body {
        Ok(Json(submission)) => submission,
        Err(rejection) => return validation_failed(vec![rejection.body_text()]),
    };

    match engine.submit(submission).await {
        Ok(job) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Job created successfully",
                "job": job,
            })),
        )
            .into_response(),
        Err(e) => engine_error_to_response(e, "Failed to create job"),
    }
}

/// `GET /jobs?status=&priority=`
pub async fn list_jobs(State(engine): State<Engine>, Query(query): Query<ListJobsQuery>) -> Response {
    let status = filter_param(query.status.as_deref(), JobStatus::parse);
    let priority = filter_param(query.priority.as_deref(), Priority::parse);

    let (Some(status), Some(priority)) = (status, priority) else {
        return Json(ListJobsResponse {
            count: 0,
            jobs: Vec::new(),
        })
        .into_response();
    };

    match engine.list(JobFilter { status, priority }).await {
        Ok(jobs) => Json(ListJobsResponse {
            count: jobs.len(),
            jobs,
        })
        .into_response(),
        Err(e) => engine_error_to_response(e, "Failed to fetch jobs"),
    }
}

/// `GET /jobs/:id`
pub async fn get_job(State(engine): State<Engine>, Path(id): Path<String>) -> Response {
    let Some(job_id) = JobId::parse(&id) else {
        return not_found();
    };

    match engine.get(job_id).await {
        Ok(job) => Json(job).into_response(),
        Err(e) => engine_error_to_response(e, "Failed to fetch job"),
    }
}

/// `POST /run-job/:id`
///
/// Responds as soon as the job is running; completion follows later.
pub async fn run_job(State(engine): State<Engine>, Path(id): Path<String>) -> Response {
    let Some(job_id) = JobId::parse(&id) else {
        return not_found();
    };

    match engine.execute(job_id).await {
        Ok(job) => Json(json!({
            "message": "Job is now running",
            "jobId": job.id,
        }))
        .into_response(),
        Err(e) => engine_error_to_response(e, "Failed to run job"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_param_distinguishes_absent_and_unknown() {
        assert_eq!(filter_param(None, JobStatus::parse), Some(None));
        assert_eq!(filter_param(Some(""), JobStatus::parse), Some(None));
        assert_eq!(
            filter_param(Some("running"), JobStatus::parse),
            Some(Some(JobStatus::Running))
        );
        assert_eq!(filter_param(Some("Running"), JobStatus::parse), None);
        assert_eq!(filter_param(Some("Urgent"), Priority::parse), None);
    }
}
