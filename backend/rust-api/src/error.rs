use axum::http::StatusCode;
use thiserror::Error;

/// Error taxonomy of the attempt engine. Every rejection carries a specific
/// reason back to the caller; nothing is swallowed or retried internally.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// A durable result already exists for this (test_taker, exam) pair.
    /// Terminal: retakes are blocked until a teacher resets the attempt.
    #[error("attempt already completed for this exam")]
    AlreadyCompleted,

    /// Lost the commit race: another final submission persisted first.
    /// Presented to callers the same way as `AlreadyCompleted`.
    #[error("attempt was already committed by a concurrent submission")]
    DuplicateAttempt,

    /// The submission does not match the current question or its choices.
    /// The caller must resubmit against the actual current question.
    #[error("invalid submission: {reason}")]
    InvalidSubmission { reason: String },

    /// No in-flight progress exists; `start_or_resume` was never called or
    /// the attempt expired.
    #[error("no active attempt for this exam")]
    NoActiveAttempt,

    #[error("exam not found: {0}")]
    ExamNotFound(String),

    /// Generator output violated the boundary contract and was rejected
    /// before reaching the question repository.
    #[error("malformed question data: {reason}")]
    MalformedQuestionData { reason: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AttemptError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AttemptError::AlreadyCompleted | AttemptError::DuplicateAttempt => {
                StatusCode::CONFLICT
            }
            AttemptError::InvalidSubmission { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AttemptError::NoActiveAttempt | AttemptError::ExamNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AttemptError::MalformedQuestionData { .. } => StatusCode::BAD_REQUEST,
            AttemptError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AttemptError> for (StatusCode, String) {
    fn from(err: AttemptError) -> Self {
        let status = err.status_code();
        let message = match &err {
            // the race loser is reported as a completed attempt
            AttemptError::DuplicateAttempt => {
                AttemptError::AlreadyCompleted.to_string()
            }
            AttemptError::Storage(inner) => {
                tracing::error!("storage error: {:#}", inner);
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        (status, message)
    }
}
