use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::{
    models::{
        attempt::AttemptKey, StartAttemptRequest, SubmitAnswerRequest, Tier,
    },
    services::{attempt_service::AttemptService, stores::group_by_tier, AppState},
};

#[derive(Debug, Serialize)]
pub struct ExamSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub easy_questions: usize,
    pub medium_questions: usize,
    pub hard_questions: usize,
}

pub async fn list_exams(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let exams = state.questions.list_exams().await?;

    let mut summaries = Vec::with_capacity(exams.len());
    for exam in exams {
        let questions = state.questions.list_questions(&exam.id).await?;
        let grouped = group_by_tier(&questions);
        let count = |tier: Tier| grouped.get(&tier).map_or(0, |qs| qs.len());

        summaries.push(ExamSummary {
            easy_questions: count(Tier::Easy),
            medium_questions: count(Tier::Medium),
            hard_questions: count(Tier::Hard),
            id: exam.id,
            title: exam.title,
            description: exam.description,
            topic: exam.topic,
            created_at: exam.created_at,
        });
    }

    Ok(Json(summaries))
}

pub async fn start_attempt(
    State(state): State<Arc<AppState>>,
    Path(exam_id): Path<String>,
    Json(req): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(
        "Start/resume attempt: exam={}, test_taker={}",
        exam_id,
        req.test_taker_id
    );

    let key = AttemptKey::new(req.test_taker_id, exam_id);
    let service = AttemptService::from_state(&state);
    let attempt = service.start_or_resume(&key).await?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

pub async fn current_question(
    State(state): State<Arc<AppState>>,
    Path((exam_id, test_taker_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let key = AttemptKey::new(test_taker_id, exam_id);
    let service = AttemptService::from_state(&state);
    let attempt = service.current_question(&key).await?;

    Ok(Json(attempt))
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path((exam_id, test_taker_id)): Path<(String, String)>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        "Answer submission: exam={}, test_taker={}, question={}",
        exam_id,
        test_taker_id,
        req.question_id
    );

    let key = AttemptKey::new(test_taker_id, exam_id);
    let service = AttemptService::from_state(&state);
    let outcome = service
        .submit_answer(&key, &req.question_id, &req.choice_id)
        .await?;

    Ok(Json(outcome))
}
