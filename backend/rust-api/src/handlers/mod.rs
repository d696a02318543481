use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::AppState;

pub mod student;
pub mod teacher;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut status = "healthy";
    let mut dependencies = serde_json::Map::new();
    let mut all_healthy = true;

    for (name, probe) in [
        ("questions", state.questions.ping().await),
        ("progress", state.progress.ping().await),
        ("attempts", state.attempts.ping().await),
    ] {
        let healthy = probe.is_ok();
        if let Err(e) = probe {
            tracing::warn!("Health check failed for {}: {}", name, e);
            all_healthy = false;
            status = "degraded";
        }
        dependencies.insert(
            name.to_string(),
            json!({ "status": if healthy { "healthy" } else { "unhealthy" } }),
        );
    }

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        axum::Json(json!({
            "status": status,
            "dependencies": dependencies,
        })),
    )
}

pub async fn metrics_handler() -> Response {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics::render(),
    )
        .into_response()
}
