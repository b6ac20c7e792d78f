//! HTTP surface for the job lifecycle service.
//!
//! Routes:
//! - `POST /jobs` submit a job
//! - `GET /jobs` list jobs, optionally filtered by `status` and `priority`
//! - `GET /jobs/:id` fetch one job
//! - `POST /run-job/:id` start a pending job
//! - `GET /health` liveness

mod errors;
mod jobs;
mod system;

use actors::Engine;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

pub use jobs::{ListJobsQuery, ListJobsResponse};

/// Build the router over a running engine.
///
/// CORS is wide open so a browser dashboard on another origin can call it.
pub fn router(engine: Engine) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(system::health))
        .route("/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route("/jobs/:id", get(jobs::get_job))
        .route("/run-job/:id", post(jobs::run_job))
        .layer(cors)
        .with_state(engine)
}
