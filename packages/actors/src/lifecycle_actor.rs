//! Lifecycle actor owning the pending -> running -> completed state machine.

use db::JobRepository;
use job_core::{Job, JobId, JobStatus, JobSubmission};
use ractor::{Actor, ActorProcessingErr, ActorRef, ActorStatus, SupervisionEvent};

use crate::engine::EngineConfig;
use crate::error::EngineError;
use crate::messages::{LifecycleMessage, SchedulerMessage};
use crate::notifier::Dispatcher;
use crate::scheduler_actor::SchedulerActor;

/// Lifecycle actor arguments.
pub(crate) struct LifecycleArgs {
    pub repo: JobRepository,
    pub dispatcher: Dispatcher,
    pub config: EngineConfig,
}

/// State for the lifecycle actor.
pub(crate) struct LifecycleState {
    repo: JobRepository,
    dispatcher: Dispatcher,
    config: EngineConfig,
    scheduler: ActorRef<SchedulerMessage>,
}

impl LifecycleState {
    async fn submit(&self, submission: JobSubmission) -> Result<Job, EngineError> {
        let new_job = submission.validate()?;
        let job = self.repo.insert(&new_job).await?;
        tracing::info!("Job {} '{}' submitted", job.id, job.task_name);
        Ok(job)
    }

    async fn execute(&self, job_id: JobId) -> Result<Job, EngineError> {
        let job = self
            .repo
            .find(job_id)
            .await?
            .ok_or(EngineError::NotFound(job_id))?;

        if !job.is_pending() {
            return Err(EngineError::InvalidState {
                job_id,
                status: job.status,
            });
        }

        // A job flipped to running without a timer would never complete.
        if self.scheduler.get_status() != ActorStatus::Running {
            return Err(EngineError::Actor(
                "Completion scheduler is not running".into(),
            ));
        }

        let Some(running) = self
            .repo
            .transition(job_id, JobStatus::Pending, JobStatus::Running)
            .await?
        else {
            // Another writer moved the row between the read and the CAS.
            return Err(self.unexpected_state(job_id).await);
        };

        schedule_completion(&self.scheduler, job_id, &self.config)?;
        tracing::info!("Job {} is now running", job_id);

        Ok(running)
    }

    async fn complete(&self, job_id: JobId) -> Result<Job, EngineError> {
        match self
            .repo
            .transition(job_id, JobStatus::Running, JobStatus::Completed)
            .await?
        {
            Some(job) => Ok(job),
            None => Err(self.unexpected_state(job_id).await),
        }
    }

    /// Explain a CAS miss by re-reading the row.
    async fn unexpected_state(&self, job_id: JobId) -> EngineError {
        match self.repo.find(job_id).await {
            Ok(Some(job)) => EngineError::InvalidState {
                job_id,
                status: job.status,
            },
            Ok(None) => EngineError::NotFound(job_id),
            Err(e) => EngineError::Storage(e),
        }
    }

    /// Fire-and-forget delivery; the job is already completed.
    fn notify(&self, job: Job) {
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            match dispatcher.dispatch(&job).await {
                Ok(()) => tracing::info!("Job {} completed and notification delivered", job.id),
                Err(e) => tracing::warn!("Notification for job {} failed: {}", job.id, e),
            }
        });
    }
}

fn schedule_completion(
    scheduler: &ActorRef<SchedulerMessage>,
    job_id: JobId,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    scheduler
        .send_message(SchedulerMessage::Schedule {
            job_id,
            delay: config.completion_delay,
        })
        .map_err(|e| {
            tracing::error!(
            "Job {} is stuck in running; its completion was not scheduled: {}",
            job_id,
            e
        );
            EngineError::Actor(format!("Failed to schedule completion: {}", e))
        })
}

/// Lifecycle actor; the single writer of job status.
pub(crate) struct LifecycleActor;

impl Actor for LifecycleActor {
    type Msg = LifecycleMessage;
    type State = LifecycleState;
    type Arguments = LifecycleArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting lifecycle engine (completion delay {:?})",
            args.config.completion_delay
        );

        let (scheduler, _handle) =
            Actor::spawn_linked(None, SchedulerActor, myself.clone(), myself.get_cell())
                .await
                .map_err(|e| ActorProcessingErr::from(format!("Failed to spawn scheduler: {}", e)))?;

        Ok(LifecycleState {
            repo: args.repo,
            dispatcher: args.dispatcher,
            config: args.config,
            scheduler,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            LifecycleMessage::Submit { submission, reply } => {
                let _ = reply.send(state.submit(submission).await);
            }

            LifecycleMessage::Execute { job_id, reply } => {
                let result = state.execute(job_id).await;
                let scheduler_lost = matches!(result, Err(EngineError::Actor(_)));
                let _ = reply.send(result);
                if scheduler_lost {
                    myself.stop(Some("completion scheduler unavailable".into()));
                }
            }

            LifecycleMessage::Complete { job_id } => match state.complete(job_id).await {
                Ok(job) => state.notify(job),
                // Nobody is waiting on a timer; the failure ends here.
                Err(e) => tracing::error!("Error completing job {}: {}", job_id, e),
            },

            LifecycleMessage::PendingTimers { reply } => {
                if let Err(e) = state
                    .scheduler
                    .send_message(SchedulerMessage::ListPending { reply })
                {
                    tracing::warn!("Failed to query scheduler: {}", e);
                }
            }

            LifecycleMessage::Shutdown => {
                tracing::info!("Shutting down lifecycle engine");
                myself.stop(None);
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.scheduler.stop(None);
        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        _state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                tracing::warn!(
                    "Child actor {} terminated: {:?}",
                    cell.get_name().unwrap_or_default(),
                    reason
                );
                // Without the scheduler no started job can complete.
                myself.stop(Some("completion scheduler stopped".into()));
            }
            SupervisionEvent::ActorFailed(cell, err) => {
                tracing::error!(
                    "Child actor {} failed: {}",
                    cell.get_name().unwrap_or_default(),
                    err
                );
                myself.stop(Some("completion scheduler failed".into()));
            }
            _ => {}
        }
        Ok(())
    }
}
