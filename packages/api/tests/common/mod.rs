use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actors::{EngineConfig, WebhookNotifier, start_engine};
use axum::routing::post;
use axum::{Json, Router};
use db::DbConfig;
use serde_json::Value;

/// Completion delay used by the tests.
pub const DELAY: Duration = Duration::from_millis(250);

/// Serve `app` on an ephemeral port until dropped.
struct Served {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Served {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for Served {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Webhook receiver that records every JSON body posted to it.
pub struct WebhookSink {
    received: Arc<Mutex<Vec<Value>>>,
    served: Served,
}

impl WebhookSink {
    pub async fn spawn() -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let app = Router::new().route(
            "/hook",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(body);
                }
            }),
        );

        Self {
            received,
            served: Served::spawn(app).await,
        }
    }

    pub fn url(&self) -> String {
        format!("{}/hook", self.served.base_url)
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

/// The full service: in-memory store, engine, and router.
pub struct TestServer {
    pub base_url: String,
    pub webhook: WebhookSink,
    _served: Served,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let webhook = WebhookSink::spawn().await;
        let repo = db::init(DbConfig::memory()).await.expect("in-memory db");
        let config = EngineConfig::default().with_completion_delay(DELAY);
        let (engine, _handle) = start_engine(repo, WebhookNotifier::new(webhook.url()), config)
            .await
            .expect("engine starts");

        let served = Served::spawn(api::router(engine)).await;
        Self {
            base_url: served.base_url.clone(),
            webhook,
            _served: served,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
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
