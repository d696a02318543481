//! In-memory store implementations. Used by the integration tests and for
//! running the API without external services.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AttemptError;
use crate::models::attempt::{AttemptKey, AttemptProgress, AttemptRecord};
use crate::models::{Exam, Question};
use crate::services::stores::{
    AttemptStore, ProgressStore, QuestionRepository, StoreResult,
};

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    exams: Mutex<HashMap<String, Exam>>,
    questions: Mutex<HashMap<String, Vec<Question>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn insert_exam(&self, exam: &Exam, questions: &[Question]) -> StoreResult<()> {
        self.exams
            .lock()
            .expect("exam map poisoned")
            .insert(exam.id.clone(), exam.clone());
        self.questions
            .lock()
            .expect("question map poisoned")
            .insert(exam.id.clone(), questions.to_vec());
        Ok(())
    }

    async fn list_exams(&self) -> StoreResult<Vec<Exam>> {
        let mut exams: Vec<Exam> = self
            .exams
            .lock()
            .expect("exam map poisoned")
            .values()
            .cloned()
            .collect();
        exams.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(exams)
    }

    async fn find_exam(&self, exam_id: &str) -> StoreResult<Option<Exam>> {
        Ok(self
            .exams
            .lock()
            .expect("exam map poisoned")
            .get(exam_id)
            .cloned())
    }

    async fn list_questions(&self, exam_id: &str) -> StoreResult<Vec<Question>> {
        Ok(self
            .questions
            .lock()
            .expect("question map poisoned")
            .get(exam_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProgressStore {
    inner: Mutex<HashMap<String, AttemptProgress>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load(&self, key: &AttemptKey) -> StoreResult<Option<AttemptProgress>> {
        Ok(self
            .inner
            .lock()
            .expect("progress map poisoned")
            .get(&key.flatten())
            .cloned())
    }

    async fn save(&self, progress: &AttemptProgress) -> StoreResult<()> {
        self.inner
            .lock()
            .expect("progress map poisoned")
            .insert(progress.key().flatten(), progress.clone());
        Ok(())
    }

    async fn clear(&self, key: &AttemptKey) -> StoreResult<()> {
        self.inner
            .lock()
            .expect("progress map poisoned")
            .remove(&key.flatten());
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAttemptStore {
    inner: Mutex<HashMap<String, AttemptRecord>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn find(&self, key: &AttemptKey) -> StoreResult<Option<AttemptRecord>> {
        Ok(self
            .inner
            .lock()
            .expect("attempt map poisoned")
            .get(&key.flatten())
            .cloned())
    }

    async fn commit(&self, record: &AttemptRecord) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("attempt map poisoned");
        if inner.contains_key(&record.id) {
            return Err(AttemptError::DuplicateAttempt);
        }
        inner.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn clear(&self, key: &AttemptKey) -> StoreResult<()> {
        self.inner
            .lock()
            .expect("attempt map poisoned")
            .remove(&key.flatten());
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
