use std::sync::Arc;

use mongodb::Client as MongoClient;
use redis::aio::ConnectionManager;

use crate::config::Config;

pub mod attempt_service;
pub mod attempt_store;
pub mod generator;
pub mod memory;
pub mod progress_store;
pub mod question_repository;
pub mod scorer;
pub mod stores;

use attempt_store::MongoAttemptStore;
use progress_store::RedisProgressStore;
use question_repository::MongoQuestionRepository;
use stores::{AttemptStore, ProgressStore, QuestionRepository};

pub struct AppState {
    pub config: Config,
    pub questions: Arc<dyn QuestionRepository>,
    pub progress: Arc<dyn ProgressStore>,
    pub attempts: Arc<dyn AttemptStore>,
}

impl AppState {
    pub async fn new(
        config: Config,
        mongo_client: MongoClient,
        redis_client: redis::Client,
    ) -> anyhow::Result<Self> {
        let mongo = mongo_client.database(&config.mongo_database);

        tracing::info!("Attempting to connect to Redis...");

        // Create ConnectionManager with longer timeout
        let redis = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            ConnectionManager::new(redis_client),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Redis connection timeout after 30s"))??;

        tracing::info!("Redis ConnectionManager created, testing with PING...");

        // Test connection
        let mut conn = redis.clone();
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Redis PING timeout after 5s"))??;

        tracing::info!("Redis connection established successfully");

        let questions = Arc::new(MongoQuestionRepository::new(mongo.clone()));
        let progress = Arc::new(RedisProgressStore::new(
            redis,
            config.progress_ttl_seconds,
        ));
        let attempts = Arc::new(MongoAttemptStore::new(mongo));

        Ok(Self::with_stores(config, questions, progress, attempts))
    }

    /// Wires the state from explicit store implementations. Tests and local
    /// runs use this with the in-memory stores.
    pub fn with_stores(
        config: Config,
        questions: Arc<dyn QuestionRepository>,
        progress: Arc<dyn ProgressStore>,
        attempts: Arc<dyn AttemptStore>,
    ) -> Self {
        Self {
            config,
            questions,
            progress,
            attempts,
        }
    }
}
