//! Core domain types for the job lifecycle service.
//!
//! This crate contains shared types used across all packages:
//! - Job, JobStatus and Priority for work items
//! - JobSubmission and its validation rules
//! - Notification, the document sent when a job completes

mod job;
mod notification;
mod submission;

pub use job::{Job, JobFilter, JobId, JobStatus, Priority};
pub use notification::Notification;
pub use submission::{JobSubmission, NewJob, ValidationError};
