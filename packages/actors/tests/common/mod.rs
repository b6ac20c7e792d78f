use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actors::{Engine, EngineConfig, NotificationError, Notifier, NotifyFuture, start_engine};
use db::DbConfig;
use job_core::Notification;

/// Completion delay used by the tests; long enough to observe `running`.
pub const DELAY: Duration = Duration::from_millis(250);

/// Notifier that records every document it is handed.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose every delivery fails after being recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> NotifyFuture {
        self.sent.lock().unwrap().push(notification);
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(NotificationError::Other("destination unreachable".into()))
            } else {
                Ok(())
            }
        })
    }
}

pub async fn start(notifier: RecordingNotifier) -> Engine {
    let repo = db::init(DbConfig::memory()).await.expect("in-memory db");
    let config = EngineConfig::default().with_completion_delay(DELAY);
    let (engine, _handle) = start_engine(repo, notifier, config)
        .await
        .expect("engine starts");
    engine
}

/// Poll `check` until it holds or five seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
