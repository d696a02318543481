use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::AttemptError;
use crate::models::attempt::{AttemptKey, AttemptProgress, AttemptRecord};
use crate::models::{Exam, Question, Tier};

pub type StoreResult<T> = Result<T, AttemptError>;

/// Read-mostly view over the authored question set. Question content is
/// immutable during an attempt; writes happen only at exam creation.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn insert_exam(&self, exam: &Exam, questions: &[Question]) -> StoreResult<()>;

    async fn list_exams(&self) -> StoreResult<Vec<Exam>>;

    async fn find_exam(&self, exam_id: &str) -> StoreResult<Option<Exam>>;

    async fn list_questions(&self, exam_id: &str) -> StoreResult<Vec<Question>>;

    /// Dependency health probe for `/health`.
    async fn ping(&self) -> StoreResult<()>;
}

/// Ephemeral per-(test_taker, exam) scratch area. Valid only for the
/// duration of one attempt; implementations may expire entries.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn load(&self, key: &AttemptKey) -> StoreResult<Option<AttemptProgress>>;

    async fn save(&self, progress: &AttemptProgress) -> StoreResult<()>;

    async fn clear(&self, key: &AttemptKey) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Durable attempt outcomes. At most one record per (test_taker, exam);
/// `commit` must enforce that at the storage layer, not just in-process.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn find(&self, key: &AttemptKey) -> StoreResult<Option<AttemptRecord>>;

    /// Writes the result and all answers as one atomic unit. Returns
    /// `AttemptError::DuplicateAttempt` when a record already exists.
    async fn commit(&self, record: &AttemptRecord) -> StoreResult<()>;

    async fn clear(&self, key: &AttemptKey) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Groups questions by tier, preserving input order within each tier.
pub fn group_by_tier(questions: &[Question]) -> BTreeMap<Tier, Vec<&Question>> {
    let mut grouped: BTreeMap<Tier, Vec<&Question>> = BTreeMap::new();
    for question in questions {
        grouped.entry(question.tier).or_default().push(question);
    }
    grouped
}
