use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AttemptError,
    metrics::{EXAMS_CREATED_TOTAL, QUESTIONS_REJECTED_TOTAL},
    models::{attempt::AttemptKey, question::GeneratedQuestion, Exam, Question},
    services::{attempt_service::AttemptService, generator::QuestionGenerator, AppState},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 255))]
    pub topic: String,
    /// Pre-authored question records. When absent, the external generator
    /// is asked for `per_tier` questions per difficulty tier.
    pub questions: Option<Vec<GeneratedQuestion>>,
    pub per_tier: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CreateExamResponse {
    pub exam_id: String,
    pub question_count: usize,
    pub rejected_count: usize,
}

pub async fn create_exam(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let records = match req.questions {
        Some(records) => records,
        None => {
            let generator = QuestionGenerator::new(state.config.generator_api_url.clone());
            generator
                .generate(&req.topic, req.per_tier.unwrap_or(2))
                .await
                .map_err(|e| {
                    tracing::error!("Question generation failed: {:#}", e);
                    (
                        StatusCode::BAD_GATEWAY,
                        "question generator unavailable".to_string(),
                    )
                })?
        }
    };

    let exam = Exam {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        description: req.description,
        topic: req.topic,
        created_at: Utc::now(),
    };

    // Boundary contract: malformed generator records never reach the
    // repository. Creation continues with the valid subset.
    let mut questions: Vec<Question> = Vec::with_capacity(records.len());
    let mut rejected_count = 0;
    for record in records {
        match record.validate() {
            Ok(()) => questions.push(record.into_question(&exam.id, &exam.topic)),
            Err(reason) => {
                QUESTIONS_REJECTED_TOTAL.inc();
                rejected_count += 1;
                tracing::warn!(
                    "Rejected malformed question record for exam {}: {}",
                    exam.id,
                    reason
                );
            }
        }
    }

    if questions.is_empty() {
        return Err(AttemptError::MalformedQuestionData {
            reason: format!("all {} generated records were rejected", rejected_count),
        }
        .into());
    }

    state.questions.insert_exam(&exam, &questions).await?;
    EXAMS_CREATED_TOTAL.inc();

    tracing::info!(
        "Exam created: id={}, questions={}, rejected={}",
        exam.id,
        questions.len(),
        rejected_count
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateExamResponse {
            exam_id: exam.id,
            question_count: questions.len(),
            rejected_count,
        }),
    ))
}

/// Deletes a test-taker's result and in-flight progress so a retake becomes
/// possible. This is the only path around the no-retake rule.
pub async fn reset_attempt(
    State(state): State<Arc<AppState>>,
    Path((exam_id, test_taker_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        "Resetting attempt: exam={}, test_taker={}",
        exam_id,
        test_taker_id
    );

    let key = AttemptKey::new(test_taker_id, exam_id);
    let service = AttemptService::from_state(&state);
    service.reset(&key).await?;

    Ok(StatusCode::NO_CONTENT)
}
