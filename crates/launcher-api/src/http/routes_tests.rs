use super::*;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use launcher_scheduler::JobScheduler;
use launcher_store::MemoryJobStore;

struct TestApp {
    router: Router,
    scheduler: JobScheduler,
    dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let scheduler = JobScheduler::builder(Arc::new(MemoryJobStore::new())).build();
        Self {
            router: create_router(AppState::new(scheduler.clone())),
            scheduler,
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, cron: &str) -> (StatusCode, Value) {
        let body = json!({
            "projectId": "proj-1",
            "commandIndex": 0,
            "command": "echo hi",
            "projectPath": self.path(),
            "projectName": "Proj",
            "commandName": "greet",
            "cronExpression": cron,
        });
        self.send("POST", "/schedules", Some(body)).await
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["activeTimers"], 0);
}

#[tokio::test]
async fn test_create_and_get_schedule() {
    let app = TestApp::new();
    let (status, body) = app.create("*/5 * * * *").await;

    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["enabled"], true);
    assert_eq!(body["data"]["timeoutMinutes"], 60);
    assert_eq!(app.scheduler.active_timer_count(), 1);

    let (status, body) = app.send("GET", &format!("/schedules/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cronExpression"], "*/5 * * * *");

    let (_, body) = app.send("GET", "/schedules", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    app.scheduler.shutdown();
}

#[tokio::test]
async fn test_create_rejects_invalid_cron() {
    let app = TestApp::new();
    let (status, body) = app.create("every tuesday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("every tuesday"));
    assert_eq!(app.scheduler.active_timer_count(), 0);
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let app = TestApp::new();
    let (status, body) = app
        .send("POST", "/schedules", Some(json!({"command": "ls"})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_missing_schedule_is_404() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/schedules/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send("PUT", "/schedules/nope", Some(json!({"enabled": false})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("POST", "/schedules/nope/run", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_and_update() {
    let app = TestApp::new();
    let (_, body) = app.create("0 9 * * *").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            "POST",
            &format!("/schedules/{}/toggle", id),
            Some(json!({"enabled": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], false);
    assert_eq!(app.scheduler.active_timer_count(), 0);

    let (status, body) = app
        .send(
            "PUT",
            &format!("/schedules/{}", id),
            Some(json!({"enabled": true, "cronExpression": "30 8 * * 1-5"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cronExpression"], "30 8 * * 1-5");
    assert_eq!(
        app.scheduler.timer_expression(&id).as_deref(),
        Some("30 8 * * 1-5")
    );

    app.scheduler.shutdown();
}

#[tokio::test]
async fn test_schedule_for_command() {
    let app = TestApp::new();
    app.create("0 9 * * *").await;

    let (status, body) = app
        .send(
            "GET",
            "/schedules/for-command?projectId=proj-1&commandIndex=0",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["command"], "echo hi");

    let (status, body) = app
        .send(
            "GET",
            "/schedules/for-command?projectId=proj-1&commandIndex=3",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    app.scheduler.shutdown();
}

#[tokio::test]
async fn test_delete_schedule_and_project() {
    let app = TestApp::new();
    let (_, body) = app.create("0 9 * * *").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    app.create("0 10 * * *").await;

    let (status, body) = app.send("DELETE", &format!("/schedules/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (status, body) = app.send("DELETE", "/projects/proj-1/schedules", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);
    assert_eq!(app.scheduler.active_timer_count(), 0);
}

#[tokio::test]
async fn test_run_now_records_log() {
    let app = TestApp::new();
    let (_, body) = app.create("0 9 * * *").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.send("POST", &format!("/schedules/{}/run", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "started");

    assert!(app.scheduler.wait_idle(Duration::from_secs(15)).await);

    let (status, body) = app
        .send("GET", &format!("/logs?scheduleId={}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    let log = &body["data"]["logs"][0];
    assert_eq!(log["status"], "success");
    assert_eq!(log["trigger"], "scheduled");
    assert_eq!(log["stdout"], "hi\n");

    let (status, body) = app
        .send("DELETE", &format!("/logs?scheduleId={}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);

    app.scheduler.shutdown();
}

#[tokio::test]
async fn test_validate_cron() {
    let app = TestApp::new();

    let (status, body) = app
        .send("POST", "/cron/validate", Some(json!({"expression": "0 9 * * 1-5"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["nextRuns"].as_array().unwrap().len(), 5);

    let (_, body) = app
        .send("POST", "/cron/validate", Some(json!({"expression": "0 9 * *"})))
        .await;
    assert_eq!(body["data"]["valid"], false);
    assert!(body["data"]["error"].is_string());
    assert!(body["data"]["nextRuns"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_execute_silent() {
    let app = TestApp::new();
    let body = json!({
        "projectPath": app.path(),
        "command": "echo manual",
        "mode": "silent",
        "projectName": "Proj",
        "commandName": "say",
    });

    let (status, body) = app.send("POST", "/execute", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["result"]["status"], "success");
    assert_eq!(body["data"]["result"]["stdout"], "manual\n");
    assert_eq!(body["data"]["log"]["trigger"], "manual");
    assert!(body["data"]["log"]["scheduleId"].is_null());
}

#[tokio::test]
async fn test_execute_missing_path() {
    let app = TestApp::new();
    let body = json!({
        "projectPath": "/definitely/not/here",
        "command": "ls",
        "mode": "silent",
    });

    let (status, body) = app.send("POST", "/execute", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
