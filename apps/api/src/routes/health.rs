use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "outreach-api"
    }))
}

/// GET /availability
/// Liveness in the shape job marketplaces poll for. Says nothing about the
/// generation backend, which is only checked on first use.
pub async fn availability_handler() -> Json<Value> {
    Json(json!({
        "status": "available",
        "type": "outreach-agent",
        "message": "Cold outreach email agent is ready to accept jobs"
    }))
}
