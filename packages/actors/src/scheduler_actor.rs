//! Timer actor that fires one-shot job completions.
//!
//! Entries live only in memory. Nothing here can be cancelled or
//! rescheduled; a timer fires once and is forgotten.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use job_core::JobId;
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tokio::time::Instant;

use crate::messages::{LifecycleMessage, SchedulerMessage};

/// An armed completion timer, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub job_id: JobId,
    /// Time left before the completion fires. Zero if overdue.
    pub remaining: Duration,
}

/// Heap entry ordered so the earliest deadline pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerEntry {
    fire_at: Instant,
    seq: u64,
    job_id: JobId,
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier deadline first, then scheduling order
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// State for the scheduler actor.
pub(crate) struct SchedulerState {
    timers: BinaryHeap<TimerEntry>,
    next_seq: u64,
    /// Receives `Complete` for every timer that fires.
    target: ActorRef<LifecycleMessage>,
}

impl SchedulerState {
    fn new(target: ActorRef<LifecycleMessage>) -> Self {
        Self {
            timers: BinaryHeap::new(),
            next_seq: 0,
            target,
        }
    }

    fn push(&mut self, job_id: JobId, fire_at: Instant) {
        self.next_seq += 1;
        self.timers.push(TimerEntry {
            fire_at,
            seq: self.next_seq,
            job_id,
        });
    }

    /// Remove and return every entry due at `now`, earliest first.
    fn take_due(&mut self, now: Instant) -> Vec<JobId> {
        let mut due = Vec::new();
        while let Some(entry) = self.timers.peek() {
            if entry.fire_at > now {
                break;
            }
            due.push(entry.job_id);
            self.timers.pop();
        }
        due
    }

    fn pending(&self, now: Instant) -> Vec<PendingTimer> {
        let mut entries: Vec<TimerEntry> = self.timers.iter().copied().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries
            .into_iter()
            .map(|entry| PendingTimer {
                job_id: entry.job_id,
                remaining: entry.fire_at.saturating_duration_since(now),
            })
            .collect()
    }
}

/// Wake the scheduler at `fire_at`.
fn arm(myself: ActorRef<SchedulerMessage>, fire_at: Instant) {
    tokio::spawn(async move {
        tokio::time::sleep_until(fire_at).await;
        let _ = myself.send_message(SchedulerMessage::Due);
    });
}

/// Scheduler actor owning the completion timers.
pub(crate) struct SchedulerActor;

impl Actor for SchedulerActor {
    type Msg = SchedulerMessage;
    type State = SchedulerState;
    type Arguments = ActorRef<LifecycleMessage>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        target: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting completion scheduler");
        Ok(SchedulerState::new(target))
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SchedulerMessage::Schedule { job_id, delay } => {
                let fire_at = Instant::now() + delay;
                state.push(job_id, fire_at);
                arm(myself, fire_at);
                tracing::debug!("Completion of job {} scheduled in {:?}", job_id, delay);
            }

            SchedulerMessage::Due => {
                for job_id in state.take_due(Instant::now()) {
                    tracing::debug!("Completion timer fired for job {}", job_id);
                    if let Err(e) = state
                        .target
                        .send_message(LifecycleMessage::Complete { job_id })
                    {
                        tracing::error!("Failed to deliver completion of job {}: {}", job_id, e);
                    }
                }
            }

            SchedulerMessage::ListPending { reply } => {
                let _ = reply.send(state.pending(Instant::now()));
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if !state.timers.is_empty() {
            tracing::warn!(
                "Scheduler stopped with {} completion timers still armed",
                state.timers.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fire_at: Instant, seq: u64, job: u64) -> TimerEntry {
        TimerEntry {
            fire_at,
            seq,
            job_id: JobId(job),
        }
    }

    #[test]
    fn earliest_deadline_pops_first() {
        let base = Instant::now();
        let mut heap = BinaryHeap::new();
        heap.push(entry(base + Duration::from_secs(3), 1, 1));
        heap.push(entry(base + Duration::from_secs(1), 2, 2));
        heap.push(entry(base + Duration::from_secs(2), 3, 3));

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.job_id.0)).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn ties_break_by_scheduling_order() {
        let at = Instant::now();
        let mut heap = BinaryHeap::new();
        heap.push(entry(at, 2, 20));
        heap.push(entry(at, 1, 10));

        assert_eq!(heap.pop().map(|e| e.job_id), Some(JobId(10)));
        assert_eq!(heap.pop().map(|e| e.job_id), Some(JobId(20)));
    }
}
