use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;

use crate::error::AttemptError;
use crate::models::{Exam, Question};
use crate::services::stores::{QuestionRepository, StoreResult};
use crate::utils::retry::{retry_async, RetryConfig};

const EXAMS_COLLECTION: &str = "exams";
const QUESTIONS_COLLECTION: &str = "questions";

pub struct MongoQuestionRepository {
    mongo: Database,
}

impl MongoQuestionRepository {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn exams(&self) -> mongodb::Collection<Exam> {
        self.mongo.collection(EXAMS_COLLECTION)
    }

    fn questions(&self) -> mongodb::Collection<Question> {
        self.mongo.collection(QUESTIONS_COLLECTION)
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn insert_exam(&self, exam: &Exam, questions: &[Question]) -> StoreResult<()> {
        self.exams()
            .insert_one(exam)
            .await
            .context("Failed to insert exam")?;

        if !questions.is_empty() {
            self.questions()
                .insert_many(questions)
                .await
                .context("Failed to insert exam questions")?;
        }

        tracing::info!(
            "Exam {} stored with {} questions",
            exam.id,
            questions.len()
        );
        Ok(())
    }

    async fn list_exams(&self) -> StoreResult<Vec<Exam>> {
        let cursor = self
            .exams()
            .find(doc! {})
            .await
            .context("Failed to query exams")?;
        let exams = cursor
            .try_collect()
            .await
            .context("Failed to read exams cursor")?;
        Ok(exams)
    }

    async fn find_exam(&self, exam_id: &str) -> StoreResult<Option<Exam>> {
        let exam = self
            .exams()
            .find_one(doc! { "_id": exam_id })
            .await
            .context("Failed to query exam")?;
        Ok(exam)
    }

    async fn list_questions(&self, exam_id: &str) -> StoreResult<Vec<Question>> {
        let retry_cfg = RetryConfig::default();
        let questions: Vec<Question> = retry_async(&retry_cfg, || async {
            let cursor = self
                .questions()
                .find(doc! { "exam_id": exam_id })
                .await
                .context("Failed to query questions")?;
            cursor
                .try_collect()
                .await
                .context("Failed to read questions cursor")
        })
        .await
        .map_err(AttemptError::Storage)?;

        Ok(questions)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}
