//! Completion notifications.
//!
//! Delivery is best effort: one attempt per completed job, no retry. The
//! outcome is returned to the caller, which logs it and moves on; it never
//! feeds back into the job's state.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use job_core::{Job, Notification};
use thiserror::Error;

/// Why a notification did not reach its destination.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Destination returned status {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Result type for notifiers.
pub type NotifyResult = Result<(), NotificationError>;

/// Future type for async notifiers.
pub type NotifyFuture = Pin<Box<dyn Future<Output = NotifyResult> + Send>>;

/// Outbound sink for completion notifications.
///
/// Implement this trait to deliver notifications somewhere other than a webhook.
pub trait Notifier: Send + Sync + 'static {
    /// Attempt delivery once.
    fn notify(&self, notification: Notification) -> NotifyFuture;
}

/// POSTs the notification as JSON to a fixed URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, notification: Notification) -> NotifyFuture {
        let request = self.client.post(&self.url).json(&notification);
        let url = self.url.clone();

        Box::pin(async move {
            tracing::info!("Triggering webhook: {}", url);
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(NotificationError::Status(status.as_u16()))
            }
        })
    }
}

/// Builds the notification document for a completed job and hands it to a notifier.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new<N: Notifier>(notifier: N) -> Self {
        Self {
            notifier: Arc::new(notifier),
        }
    }

    /// Make exactly one delivery attempt for `job`.
    pub async fn dispatch(&self, job: &Job) -> NotifyResult {
        self.notifier.notify(Notification::from(job)).await
    }
}
