//! Actor system for the job lifecycle engine.
//!
//! This crate provides the Ractor-based actors that move jobs through
//! `pending -> running -> completed` and notify an external endpoint
//! when they finish.
//!
//! # Architecture
//!
//! - `LifecycleActor` - Single writer of job status; validates submissions,
//!   guards execute, performs the completion step
//! - `SchedulerActor` - Time-ordered queue of one-shot completion timers
//! - `Dispatcher` - Best-effort delivery of the completion notification
//!
//! # Usage
//!
//! ```ignore
//! use actors::{EngineConfig, WebhookNotifier, start_engine};
//!
//! let repo = db::init(db::DbConfig::memory()).await?;
//! let notifier = WebhookNotifier::new("https://example.com/hook");
//! let (engine, _handle) = start_engine(repo, notifier, EngineConfig::default()).await?;
//!
//! let job = engine.submit(submission).await?;
//! engine.execute(job.id).await?;
//! ```

mod engine;
mod error;
mod lifecycle_actor;
mod messages;
mod notifier;
mod scheduler_actor;

pub use engine::{DEFAULT_COMPLETION_DELAY, Engine, EngineConfig, start_engine};
pub use error::EngineError;
pub use notifier::{
    Dispatcher, NotificationError, Notifier, NotifyFuture, NotifyResult, WebhookNotifier,
};
pub use scheduler_actor::PendingTimer;
