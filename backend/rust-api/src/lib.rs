#![allow(dead_code)]

use axum::{
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1/exams", exam_routes().layer(cors))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

fn exam_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::student::list_exams).post(handlers::teacher::create_exam),
        )
        .route(
            "/{exam_id}/attempts",
            post(handlers::student::start_attempt),
        )
        .route(
            "/{exam_id}/attempts/{test_taker_id}/question",
            get(handlers::student::current_question),
        )
        .route(
            "/{exam_id}/attempts/{test_taker_id}/answers",
            post(handlers::student::submit_answer),
        )
        .route(
            "/{exam_id}/attempts/{test_taker_id}",
            delete(handlers::teacher::reset_attempt),
        )
}
