//! Axum route handlers for the outreach pipeline.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::outreach::models::{
    OutreachInput, OutreachResult, Tone, COMPANY_NAME_CHARS, OUTREACH_GOAL_CHARS,
    PRODUCT_DESCRIPTION_CHARS, TARGET_ROLE_CHARS,
};
use crate::outreach::tone::tone_label;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct InputField {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub name: &'static str,
    pub data: Value,
    pub validations: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct InputSchemaResponse {
    pub input_data: Vec<InputField>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /run
///
/// Validates the request and runs the pipeline synchronously.
/// Expect 15-30 seconds: one page fetch plus three generation calls.
pub async fn handle_run(
    State(state): State<AppState>,
    payload: Result<Json<OutreachInput>, JsonRejection>,
) -> Result<Json<OutreachResult>, AppError> {
    let Json(input) = payload.map_err(rejection_to_validation)?;
    let request = input.validate()?;

    info!(
        "Running outreach pipeline for {} ({})",
        request.company_name, request.company_website
    );
    let result = state.pipeline().run(&request).await?;

    Ok(Json(result))
}

/// GET /input_schema
///
/// Describes the fields `/run` and `/start_job` expect, for form builders.
pub async fn handle_input_schema() -> Json<InputSchemaResponse> {
    let text = |id, name, placeholder: &str, (min, max): (usize, usize)| InputField {
        id,
        field_type: "string",
        name,
        data: json!({ "placeholder": placeholder }),
        validations: vec![
            json!({ "type": "required" }),
            json!({ "type": "min_length", "value": min }),
            json!({ "type": "max_length", "value": max }),
        ],
    };

    let tone_options: Vec<Value> = Tone::ALL
        .into_iter()
        .map(|tone| json!({ "value": tone.as_str(), "label": tone_label(tone) }))
        .collect();

    Json(InputSchemaResponse {
        input_data: vec![
            text("company_name", "Company Name", "e.g., Stripe", COMPANY_NAME_CHARS),
            InputField {
                id: "company_website",
                field_type: "string",
                name: "Company Website",
                data: json!({ "placeholder": "https://stripe.com" }),
                validations: vec![json!({ "type": "required" }), json!({ "type": "url" })],
            },
            text("target_role", "Target Role", "e.g., Head of Growth", TARGET_ROLE_CHARS),
            text(
                "product_description",
                "Your Product Description",
                "AI-powered tool that...",
                PRODUCT_DESCRIPTION_CHARS,
            ),
            text(
                "outreach_goal",
                "Outreach Goal",
                "Book a 15-minute demo call",
                OUTREACH_GOAL_CHARS,
            ),
            InputField {
                id: "tone",
                field_type: "option",
                name: "Email Tone",
                data: json!({ "options": tone_options }),
                validations: vec![json!({ "type": "required" })],
            },
        ],
    })
}

/// Malformed or incomplete JSON bodies are client errors like any other.
pub fn rejection_to_validation(rejection: JsonRejection) -> AppError {
    AppError::Validation {
        message: "Request body is not valid JSON for this endpoint".to_string(),
        details: vec![rejection.body_text()],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::llm_client::TaskKind;
    use crate::outreach::testing::{ScriptedPort, StaticPage, UnreachablePage, ACME_PAGE};
    use crate::routes::build_router;
    use crate::state::AppState;

    fn acme_body() -> serde_json::Value {
        json!({
            "company_name": "Acme Corp",
            "company_website": "https://acme.example.com",
            "target_role": "VP of Engineering",
            "product_description": "AI-powered code review tool that halves PR review time",
            "outreach_goal": "Book a 15-minute demo call",
            "tone": "professional"
        })
    }

    async fn post_run(state: AppState, body: String) -> (StatusCode, serde_json::Value) {
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/run")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_run_returns_outreach_result() {
        let state = AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path()),
        );
        let (status, body) = post_run(state, acme_body().to_string()).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["subject_lines"].as_array().unwrap().len(), 3);
        assert_eq!(body["spam_risk_score"], "low");
        assert_eq!(
            body["personalization_points"][0],
            "Recently launched a developer API"
        );
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_input_before_pipeline() {
        let port = Arc::new(ScriptedPort::happy_path());
        let state = AppState::for_tests(Arc::new(StaticPage(ACME_PAGE)), port.clone());

        let mut body = acme_body();
        body["tone"] = json!("aggressive");
        let (status, body) = post_run(state, body.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert!(port.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_malformed_json() {
        let state = AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path()),
        );
        let (status, body) = post_run(state, r#"{"company_name": "Acme""#.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_run_maps_unreachable_site_to_gateway_error() {
        let state = AppState::for_tests(
            Arc::new(UnreachablePage),
            Arc::new(ScriptedPort::happy_path()),
        );
        let (status, body) = post_run(state, acme_body().to_string()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "scrape_failed");
    }

    #[tokio::test]
    async fn test_run_maps_unparseable_output_to_agent_error() {
        let state = AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path().respond(TaskKind::Qa, "Looks fine to me.")),
        );
        let (status, body) = post_run(state, acme_body().to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "agent_error");
        assert_eq!(body["error"]["details"][0], "stage: qa");
    }

    #[tokio::test]
    async fn test_input_schema_lists_all_fields() {
        let state = AppState::for_tests(
            Arc::new(StaticPage(ACME_PAGE)),
            Arc::new(ScriptedPort::happy_path()),
        );
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/input_schema")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let ids: Vec<&str> = body["input_data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec![
                "company_name",
                "company_website",
                "target_role",
                "product_description",
                "outreach_goal",
                "tone"
            ]
        );
        assert_eq!(body["input_data"][5]["data"]["options"][2]["value"], "founder");
    }
}
