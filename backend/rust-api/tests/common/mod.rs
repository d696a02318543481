#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;

use examgate_api::config::Config;
use examgate_api::models::{AnswerChoice, Exam, Question, Tier};
use examgate_api::services::attempt_service::AttemptService;
use examgate_api::services::memory::{
    InMemoryAttemptStore, InMemoryProgressStore, InMemoryQuestionRepository,
};
use examgate_api::services::stores::QuestionRepository;
use examgate_api::AppState;

pub struct TestHarness {
    pub questions: Arc<InMemoryQuestionRepository>,
    pub progress: Arc<InMemoryProgressStore>,
    pub attempts: Arc<InMemoryAttemptStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();

        Self {
            questions: Arc::new(InMemoryQuestionRepository::new()),
            progress: Arc::new(InMemoryProgressStore::new()),
            attempts: Arc::new(InMemoryAttemptStore::new()),
        }
    }

    pub fn service(&self) -> AttemptService {
        AttemptService::new(
            self.questions.clone(),
            self.progress.clone(),
            self.attempts.clone(),
        )
    }

    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState::with_stores(
            test_config(),
            self.questions.clone(),
            self.progress.clone(),
            self.attempts.clone(),
        ))
    }

    /// Seeds an exam with deterministic ids: questions e1.., m1.., h1..,
    /// each with choices `{id}-right` (correct) and `{id}-w1`/`{id}-w2`/
    /// `{id}-w3`.
    pub async fn seed_exam(&self, exam_id: &str, easy: usize, medium: usize, hard: usize) {
        let exam = Exam {
            id: exam_id.to_string(),
            title: format!("Exam {}", exam_id),
            description: "seeded test exam".to_string(),
            topic: "testing".to_string(),
            created_at: Utc::now(),
        };

        let mut questions = Vec::new();
        for (prefix, tier, count) in [
            ("e", Tier::Easy, easy),
            ("m", Tier::Medium, medium),
            ("h", Tier::Hard, hard),
        ] {
            for i in 1..=count {
                questions.push(question(exam_id, &format!("{}{}", prefix, i), tier));
            }
        }

        self.questions
            .insert_exam(&exam, &questions)
            .await
            .expect("seeding exam failed");
    }
}

pub fn question(exam_id: &str, id: &str, tier: Tier) -> Question {
    let mut choices = vec![AnswerChoice {
        id: format!("{}-right", id),
        text: "right answer".to_string(),
        is_correct: true,
    }];
    for i in 1..=3 {
        choices.push(AnswerChoice {
            id: format!("{}-w{}", id, i),
            text: format!("wrong answer {}", i),
            is_correct: false,
        });
    }

    Question {
        id: id.to_string(),
        exam_id: exam_id.to_string(),
        text: format!("question {}", id),
        tier,
        topic: "testing".to_string(),
        choices,
    }
}

pub fn test_config() -> Config {
    Config {
        mongo_uri: "mongodb://unused".to_string(),
        redis_uri: "redis://unused".to_string(),
        mongo_database: "examgate_test".to_string(),
        generator_api_url: "http://localhost:8000".to_string(),
        progress_ttl_seconds: 60,
    }
}
