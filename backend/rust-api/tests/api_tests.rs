mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::TestHarness;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let harness = TestHarness::new();
    let app = examgate_api::create_router(harness.app_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn create_exam_rejects_malformed_records_and_keeps_valid_ones() {
    let harness = TestHarness::new();
    let app = examgate_api::create_router(harness.app_state());

    let valid = json!({
        "text": "What does HTTP stand for?",
        "tier": "easy",
        "answer_choices": [
            {"text": "HyperText Transfer Protocol", "is_correct": true},
            {"text": "High Throughput Protocol", "is_correct": false},
            {"text": "Host Transfer Path", "is_correct": false},
            {"text": "Hyperlink Text Parser", "is_correct": false}
        ]
    });
    let two_corrects = json!({
        "text": "Broken record",
        "tier": "easy",
        "answer_choices": [
            {"text": "a", "is_correct": true},
            {"text": "b", "is_correct": true},
            {"text": "c", "is_correct": false},
            {"text": "d", "is_correct": false}
        ]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/exams",
            json!({
                "title": "Networking basics",
                "topic": "networking",
                "questions": [valid, two_corrects]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = response_json(response).await;
    assert_eq!(json["question_count"], 1);
    assert_eq!(json["rejected_count"], 1);

    // exam shows up in the listing with its per-tier counts
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/exams")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = response_json(response).await;
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["easy_questions"], 1);
    assert_eq!(listing[0]["medium_questions"], 0);
}

#[tokio::test]
async fn create_exam_fails_when_nothing_valid_remains() {
    let harness = TestHarness::new();
    let app = examgate_api::create_router(harness.app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/exams",
            json!({
                "title": "Broken exam",
                "topic": "nothing",
                "questions": [{
                    "text": "No correct choice",
                    "tier": "easy",
                    "answer_choices": [
                        {"text": "a", "is_correct": false},
                        {"text": "b", "is_correct": false},
                        {"text": "c", "is_correct": false},
                        {"text": "d", "is_correct": false}
                    ]
                }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attempt_flow_over_http() {
    let harness = TestHarness::new();
    harness.seed_exam("exam-1", 1, 0, 0).await;
    let app = examgate_api::create_router(harness.app_state());

    // start
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/exams/exam-1/attempts",
            json!({"test_taker_id": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = response_json(response).await;
    assert_eq!(json["question"]["id"], "e1");
    assert_eq!(json["finished"], false);
    assert_eq!(json["unlocked_tiers"], json!(["easy"]));

    // current question is stable across reads
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/exams/exam-1/attempts/alice/question")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["question"]["id"], "e1");

    // out-of-order submission is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/exams/exam-1/attempts/alice/answers",
            json!({"question_id": "e9", "choice_id": "e9-right"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // answering the single easy question wrong finishes the attempt
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/exams/exam-1/attempts/alice/answers",
            json!({"question_id": "e1", "choice_id": "e1-w1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["correct"], false);
    assert_eq!(json["finished"], true);
    assert_eq!(json["result"]["eligibility"], "Needs Improvement");
    assert_eq!(json["result"]["easy_total"], 1);

    // no retake
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/exams/exam-1/attempts",
            json!({"test_taker_id": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // until a teacher resets the attempt
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/exams/exam-1/attempts/alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/exams/exam-1/attempts",
            json!({"test_taker_id": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_exam_returns_not_found() {
    let harness = TestHarness::new();
    let app = examgate_api::create_router(harness.app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/exams/missing/attempts",
            json!({"test_taker_id": "bob"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_test_taker_id_is_rejected() {
    let harness = TestHarness::new();
    harness.seed_exam("exam-1", 1, 0, 0).await;
    let app = examgate_api::create_router(harness.app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/exams/exam-1/attempts",
            json!({"test_taker_id": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
