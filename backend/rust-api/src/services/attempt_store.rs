use anyhow::Context;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::Database;

use crate::error::AttemptError;
use crate::models::attempt::{AttemptKey, AttemptRecord};
use crate::services::stores::{AttemptStore, StoreResult};

const ATTEMPTS_COLLECTION: &str = "exam_attempts";

/// Durable attempt results. The record `_id` is the flattened attempt key,
/// so Mongo's `_id` uniqueness is the constraint that closes the
/// duplicate-commit race; the embedded answers make the insert atomic.
pub struct MongoAttemptStore {
    mongo: Database,
}

impl MongoAttemptStore {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn attempts(&self) -> mongodb::Collection<AttemptRecord> {
        self.mongo.collection(ATTEMPTS_COLLECTION)
    }

    fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
        if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
            ref write_error,
        )) = *err.kind
        {
            return write_error.code == 11000;
        }
        false
    }
}

#[async_trait]
impl AttemptStore for MongoAttemptStore {
    async fn find(&self, key: &AttemptKey) -> StoreResult<Option<AttemptRecord>> {
        let record = self
            .attempts()
            .find_one(doc! { "_id": key.flatten() })
            .await
            .context("Failed to query attempt record")?;
        Ok(record)
    }

    async fn commit(&self, record: &AttemptRecord) -> StoreResult<()> {
        match self.attempts().insert_one(record).await {
            Ok(_) => {
                tracing::info!(
                    "Attempt committed: test_taker={}, exam={}, eligibility={}",
                    record.test_taker_id,
                    record.exam_id,
                    record.result.eligibility.as_str()
                );
                Ok(())
            }
            Err(e) if Self::is_duplicate_key(&e) => Err(AttemptError::DuplicateAttempt),
            Err(e) => Err(AttemptError::Storage(
                anyhow::Error::new(e).context("Failed to commit attempt record"),
            )),
        }
    }

    async fn clear(&self, key: &AttemptKey) -> StoreResult<()> {
        self.attempts()
            .delete_one(doc! { "_id": key.flatten() })
            .await
            .context("Failed to delete attempt record")?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}
