pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::outreach::handlers as outreach;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/availability", get(health::availability_handler))
        .route("/input_schema", get(outreach::handle_input_schema))
        // Synchronous pipeline run
        .route("/run", post(outreach::handle_run))
        // Job-style surface over the same pipeline
        .route("/start_job", post(jobs::handle_start_job))
        .route("/status", get(jobs::handle_status))
        .with_state(state)
}
