use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::{input_hash, JobRecord, JobStatus};
use crate::outreach::handlers::rejection_to_validation;
use crate::outreach::models::OutreachInput;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartJobRequest {
    pub identifier_from_purchaser: String,
    pub input_data: OutreachInput,
}

#[derive(Debug, Serialize)]
pub struct StartJobResponse {
    pub id: Uuid,
    pub status: &'static str,
    pub job_id: Uuid,
    pub identifier_from_purchaser: String,
    pub input_hash: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub status: JobStatus,
    pub result: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /start_job
///
/// Runs the pipeline to completion and records the outcome. A failed run still
/// answers `"success"`: the job was accepted, and `/status` reports the failure.
pub async fn handle_start_job(
    State(state): State<AppState>,
    payload: Result<Json<StartJobRequest>, JsonRejection>,
) -> Result<Json<StartJobResponse>, AppError> {
    let Json(body) = payload.map_err(rejection_to_validation)?;
    let request = body.input_data.validate()?;

    let mut record = JobRecord::running(body.identifier_from_purchaser, input_hash(&request));
    state.jobs.put(record.clone()).await;
    info!("Job {} started for {}", record.job_id, request.company_name);

    // Spawned so the job reaches a terminal status even if the caller hangs up.
    let jobs = state.jobs.clone();
    let pipeline = state.pipeline();
    let run = tokio::spawn(async move {
        record.settle(pipeline.run(&request).await);
        jobs.put(record.clone()).await;
        record
    });
    let record = run
        .await
        .map_err(|e| anyhow::anyhow!("Job task did not finish: {e}"))?;

    Ok(Json(StartJobResponse {
        id: record.id,
        status: "success",
        job_id: record.job_id,
        identifier_from_purchaser: record.identifier_from_purchaser,
        input_hash: record.input_hash,
        submitted_at: record.submitted_at,
    }))
}

/// GET /status?job_id=
pub async fn handle_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::Validation {
        message: "Missing or invalid query parameters".to_string(),
        details: vec![e.body_text()],
    })?;

    let not_found = || AppError::NotFound(format!("Job {} not found", query.job_id));
    let job_id = Uuid::parse_str(&query.job_id).map_err(|_| not_found())?;
    let record = state.jobs.get(job_id).await.ok_or_else(not_found)?;

    Ok(Json(JobStatusResponse {
        id: record.id,
        job_id: record.job_id,
        status: record.status,
        result: record.result,
        updated_at: record.updated_at,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use url::Url;

    use crate::jobs::{InMemoryJobStore, JobRecord, JobStatus, JobStore};
    use crate::llm_client::TaskKind;
    use crate::outreach::models::{OutreachResult, SpamRisk};
    use crate::outreach::testing::{ScriptedFailure, ScriptedPort, StaticPage, ACME_PAGE};
    use crate::routes::build_router;
    use crate::scrape::{FetchError, PageSource, PageText};
    use crate::state::AppState;

    fn start_body() -> Value {
        json!({
            "identifier_from_purchaser": "purchaser-42",
            "input_data": {
                "company_name": "Acme Corp",
                "company_website": "https://acme.example.com",
                "target_role": "VP of Engineering",
                "product_description": "AI-powered code review tool that halves PR review time",
                "outreach_goal": "Book a 15-minute demo call",
                "tone": "founder"
            }
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_start(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/start_job")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_status(job_id: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/status?job_id={job_id}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_job_then_status_returns_stored_result() {
        let app = build_router(AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path()),
        ));

        let (status, started) = send(&app, post_start(&start_body())).await;
        assert_eq!(status, StatusCode::OK, "{started}");
        assert_eq!(started["status"], "success");
        assert_eq!(started["identifier_from_purchaser"], "purchaser-42");
        assert_eq!(started["input_hash"].as_str().unwrap().len(), 64);

        let job_id = started["job_id"].as_str().unwrap();
        let (status, job) = send(&app, get_status(job_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["status"], "completed");
        assert_eq!(job["id"], started["id"]);
        assert!(job["updated_at"].as_str().unwrap() >= started["submitted_at"].as_str().unwrap());

        let result: OutreachResult =
            serde_json::from_str(job["result"].as_str().unwrap()).unwrap();
        assert_eq!(result.subject_lines.len(), 3);
        assert_eq!(result.spam_risk_score, SpamRisk::Low);
    }

    #[tokio::test]
    async fn test_failed_pipeline_is_recorded_not_raised() {
        let app = build_router(AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path().fail(TaskKind::Copy, ScriptedFailure::Provider)),
        ));

        let (status, started) = send(&app, post_start(&start_body())).await;
        assert_eq!(status, StatusCode::OK);

        let (_, job) = send(&app, get_status(started["job_id"].as_str().unwrap())).await;
        assert_eq!(job["status"], "failed");
        let result: Value = serde_json::from_str(job["result"].as_str().unwrap()).unwrap();
        assert!(result["error"].as_str().unwrap().starts_with("Provider error"));
    }

    #[tokio::test]
    async fn test_start_job_rejects_invalid_input_without_creating_job() {
        let port = Arc::new(ScriptedPort::happy_path());
        let app = build_router(AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            port.clone(),
        ));

        let mut body = start_body();
        body["input_data"]["company_website"] = json!("ftp://acme.example.com");
        let (status, err) = send(&app, post_start(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"]["code"], "validation_error");
        assert!(port.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_status_unknown_job_is_not_found() {
        let app = build_router(AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path()),
        ));

        let (status, err) = send(&app, get_status(&uuid::Uuid::new_v4().to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["error"]["code"], "not_found");

        let (status, _) = send(&app, get_status("not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_requires_job_id() {
        let app = build_router(AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path()),
        ));

        let (status, err) = send(
            &app,
            Request::builder().uri("/status").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"]["code"], "validation_error");
    }

    /// Records the status of every write.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryJobStore,
        statuses: Mutex<Vec<JobStatus>>,
    }

    #[async_trait]
    impl JobStore for RecordingStore {
        async fn put(&self, record: JobRecord) {
            self.statuses.lock().unwrap().push(record.status);
            self.inner.put(record).await;
        }

        async fn get(&self, job_id: uuid::Uuid) -> Option<JobRecord> {
            self.inner.get(job_id).await
        }
    }

    /// Serves the Acme page after a delay.
    struct SlowPage(Duration);

    #[async_trait]
    impl PageSource for SlowPage {
        async fn fetch_and_extract(&self, _url: &Url) -> Result<PageText, FetchError> {
            tokio::time::sleep(self.0).await;
            Ok(PageText::from_trusted(ACME_PAGE))
        }
    }

    #[tokio::test]
    async fn test_job_completes_after_caller_disconnects() {
        let store = Arc::new(RecordingStore::default());
        let mut state = AppState::for_tests(
            Arc::new(SlowPage(Duration::from_millis(300))),
            Arc::new(ScriptedPort::happy_path()),
        );
        state.jobs = store.clone();
        let app = build_router(state);

        // The caller gives up long before the page arrives.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), app.oneshot(post_start(&start_body())))
                .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(
            *store.statuses.lock().unwrap(),
            vec![JobStatus::Running, JobStatus::Completed]
        );
    }
}
