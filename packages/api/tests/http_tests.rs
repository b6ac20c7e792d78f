#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;

use common::{DELAY, TestServer};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn create(
    client: &reqwest::Client,
    server: &TestServer,
    body: Value,
) -> Result<Value, Box<dyn Error>> {
    let res = client.post(server.url("/jobs")).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    Ok(body["job"].clone())
}

async fn status_of(client: &reqwest::Client, server: &TestServer, id: &Value) -> Option<String> {
    let res = client
        .get(server.url(&format!("/jobs/{}", id)))
        .send()
        .await
        .ok()?;
    let body: Value = res.json().await.ok()?;
    body["status"].as_str().map(str::to_string)
}

#[tokio::test]
async fn health_reports_running() -> Result<(), Box<dyn Error>> {
    let server = TestServer::spawn().await;
    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({"status": "Backend is running"}));
    Ok(())
}

#[tokio::test]
async fn create_job_returns_created_pending_job() -> Result<(), Box<dyn Error>> {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/jobs"))
        .json(&json!({
            "taskName": "Send Email",
            "priority": "Medium",
            "payload": {"to": "a@b.com"}
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Job created successfully");
    let job = &body["job"];
    assert!(job["id"].is_u64());
    assert_eq!(job["taskName"], "Send Email");
    assert_eq!(job["priority"], "Medium");
    assert_eq!(job["status"], "pending");
    assert_eq!(job["payload"], json!({"to": "a@b.com"}));
    assert!(job["createdAt"].is_string());
    assert!(job["updatedAt"].is_string());
    assert!(job["completedAt"].is_null());
    Ok(())
}

#[tokio::test]
async fn create_job_rejects_invalid_input() -> Result<(), Box<dyn Error>> {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/jobs"))
        .json(&json!({"taskName": "", "priority": "Critical"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_array().cloned().unwrap_or_default();
    assert_eq!(details.len(), 2);

    let res = client
        .post(server.url("/jobs"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Validation failed");

    let res = client.get(server.url("/jobs")).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn get_job_not_found() -> Result<(), Box<dyn Error>> {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/jobs/999", "/jobs/abc"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = res.json().await?;
        assert_eq!(body, json!({"error": "Job not found"}));
    }

    let res = client.post(server.url("/run-job/999")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn run_job_completes_and_posts_webhook() -> Result<(), Box<dyn Error>> {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let job = create(
        &client,
        &server,
        json!({"taskName": "Resize Image", "priority": "High", "payload": {"w": 640}}),
    )
    .await?;
    let id = job["id"].clone();

    let res = client
        .post(server.url(&format!("/run-job/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Job is now running");
    assert_eq!(body["jobId"], id);

    assert_eq!(
        status_of(&client, &server, &id).await.as_deref(),
        Some("running")
    );

    let res = client
        .post(server.url(&format!("/run-job/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Job is already running");

    assert!(
        common::eventually(|| async {
            status_of(&client, &server, &id).await.as_deref() == Some("completed")
        })
        .await
    );
    assert!(common::eventually(|| async { !server.webhook.received().is_empty() }).await);
    tokio::time::sleep(DELAY * 2).await;

    let received = server.webhook.received();
    assert_eq!(received.len(), 1);
    let hook = &received[0];
    assert_eq!(hook["jobId"], id);
    assert_eq!(hook["taskName"], "Resize Image");
    assert_eq!(hook["status"], "completed");
    assert_eq!(hook["priority"], "High");
    assert_eq!(hook["payload"], json!({"w": 640}));
    assert!(hook["completedAt"].is_string());
    assert!(hook["createdAt"].is_string());

    let res = client
        .post(server.url(&format!("/run-job/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Job has already been completed");
    Ok(())
}

#[tokio::test]
async fn list_jobs_filters_and_orders_newest_first() -> Result<(), Box<dyn Error>> {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let low = create(&client, &server, json!({"taskName": "Cleanup", "priority": "Low"})).await?;
    let high = create(&client, &server, json!({"taskName": "Page", "priority": "High"})).await?;

    let list = |query: &'static str| {
        let client = client.clone();
        let url = server.url(&format!("/jobs{}", query));
        async move {
            let res = client.get(url).send().await?;
            assert_eq!(res.status(), StatusCode::OK);
            res.json::<Value>().await
        }
    };

    let all = list("").await?;
    assert_eq!(all["count"], 2);
    assert_eq!(all["jobs"][0]["id"], high["id"]);
    assert_eq!(all["jobs"][1]["id"], low["id"]);

    let high_only = list("?priority=High").await?;
    assert_eq!(high_only["count"], 1);
    assert_eq!(high_only["jobs"][0]["id"], high["id"]);

    let pending_low = list("?status=pending&priority=Low").await?;
    assert_eq!(pending_low["count"], 1);
    assert_eq!(pending_low["jobs"][0]["id"], low["id"]);

    let unfiltered = list("?status=&priority=").await?;
    assert_eq!(unfiltered["count"], 2);

    let none = list("?status=completed").await?;
    assert_eq!(none, json!({"count": 0, "jobs": []}));

    let unknown = list("?priority=Urgent").await?;
    assert_eq!(unknown, json!({"count": 0, "jobs": []}));
    Ok(())
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() -> Result<(), Box<dyn Error>> {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, server.url("/jobs"))
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await?;
    assert!(res.status().is_success());
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(res.headers().contains_key("access-control-allow-methods"));

    let res = client
        .get(server.url("/jobs"))
        .header("origin", "http://localhost:3000")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    Ok(())
}
