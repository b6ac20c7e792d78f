//! Message types for actor communication.

use std::time::Duration;

use job_core::{Job, JobId, JobSubmission};
use ractor::RpcReplyPort;

use crate::error::EngineError;
use crate::scheduler_actor::PendingTimer;

/// Messages for the LifecycleActor.
#[derive(Debug)]
pub(crate) enum LifecycleMessage {
    /// Validate and store a new job.
    Submit {
        submission: JobSubmission,
        reply: RpcReplyPort<Result<Job, EngineError>>,
    },

    /// Move a pending job to running and arm its completion timer.
    Execute {
        job_id: JobId,
        reply: RpcReplyPort<Result<Job, EngineError>>,
    },

    /// Sent by the scheduler once a job's delay has elapsed.
    Complete { job_id: JobId },

    /// List armed completion timers.
    PendingTimers {
        reply: RpcReplyPort<Vec<PendingTimer>>,
    },

    /// Stop the engine and its scheduler.
    Shutdown,
}

/// Messages for the SchedulerActor.
#[derive(Debug)]
pub(crate) enum SchedulerMessage {
    /// Arm a one-shot completion for `job_id` after `delay`.
    Schedule { job_id: JobId, delay: Duration },

    /// A sleep elapsed; fire everything that is due.
    Due,

    /// Snapshot the armed timers.
    ListPending {
        reply: RpcReplyPort<Vec<PendingTimer>>,
    },
}
