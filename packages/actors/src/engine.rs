//! Client handle for the lifecycle engine.

use std::time::Duration;

use db::JobRepository;
use job_core::{Job, JobFilter, JobId, JobSubmission};
use ractor::{Actor, ActorRef, RpcReplyPort};

use crate::error::EngineError;
use crate::lifecycle_actor::{LifecycleActor, LifecycleArgs};
use crate::messages::LifecycleMessage;
use crate::notifier::{Dispatcher, Notifier};
use crate::scheduler_actor::PendingTimer;

/// Default delay between a job starting and completing.
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_secs(3);

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed delay between execute and the completion step.
    pub completion_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

impl EngineConfig {
    /// Set the completion delay.
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }
}

/// Cloneable handle to a running engine.
///
/// Writes go through the lifecycle actor; reads hit the repository directly
/// and never touch job state.
#[derive(Clone)]
pub struct Engine {
    lifecycle: ActorRef<LifecycleMessage>,
    repo: JobRepository,
}

impl Engine {
    /// Submit a new job. Fails with `Validation` without touching the store.
    pub async fn submit(&self, submission: JobSubmission) -> Result<Job, EngineError> {
        self.call(|reply| LifecycleMessage::Submit { submission, reply })
            .await?
    }

    /// Start a pending job.
    ///
    /// Returns once the job is marked running; completion happens later.
    pub async fn execute(&self, job_id: JobId) -> Result<Job, EngineError> {
        self.call(|reply| LifecycleMessage::Execute { job_id, reply })
            .await?
    }

    /// Get a job by ID.
    pub async fn get(&self, job_id: JobId) -> Result<Job, EngineError> {
        self.repo
            .find(job_id)
            .await?
            .ok_or(EngineError::NotFound(job_id))
    }

    /// List jobs matching `filter`, newest first.
    pub async fn list(&self, filter: JobFilter) -> Result<Vec<Job>, EngineError> {
        Ok(self.repo.list(filter).await?)
    }

    /// Completion timers that have not fired yet, soonest first.
    pub async fn pending_timers(&self) -> Result<Vec<PendingTimer>, EngineError> {
        self.call(|reply| LifecycleMessage::PendingTimers { reply })
            .await
    }

    /// Stop the engine. Armed timers are dropped.
    pub fn shutdown(&self) {
        if let Err(e) = self.lifecycle.send_message(LifecycleMessage::Shutdown) {
            tracing::warn!("Engine already stopped: {}", e);
        }
    }

    async fn call<T: Send + 'static>(
        &self,
        build: impl FnOnce(RpcReplyPort<T>) -> LifecycleMessage,
    ) -> Result<T, EngineError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.lifecycle
            .send_message(build(tx.into()))
            .map_err(|e| EngineError::Actor(format!("Failed to send message: {}", e)))?;

        rx.await
            .map_err(|_| EngineError::Actor("Failed to receive response".into()))
    }
}

/// Start the lifecycle engine with the given store and notifier.
pub async fn start_engine<N: Notifier>(
    repo: JobRepository,
    notifier: N,
    config: EngineConfig,
) -> Result<(Engine, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    let args = LifecycleArgs {
        repo: repo.clone(),
        dispatcher: Dispatcher::new(notifier),
        config,
    };

    let (lifecycle, handle) = Actor::spawn(None, LifecycleActor, args).await?;

    Ok((Engine { lifecycle, repo }, handle))
}
