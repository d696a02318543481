use anyhow::Context;
use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::error::AttemptError;
use crate::models::attempt::{AttemptKey, AttemptProgress};
use crate::services::stores::{ProgressStore, StoreResult};
use crate::utils::retry::{retry_async, RetryConfig};

/// Redis-backed attempt progress, one JSON value per (test_taker, exam)
/// under a TTL. Expiry is the cleanup policy for abandoned attempts.
pub struct RedisProgressStore {
    redis: ConnectionManager,
    ttl_seconds: i64,
}

impl RedisProgressStore {
    pub fn new(redis: ConnectionManager, ttl_seconds: i64) -> Self {
        Self { redis, ttl_seconds }
    }

    fn progress_key(key: &AttemptKey) -> String {
        format!("attempt:progress:{}", key.flatten())
    }
}

#[async_trait]
impl ProgressStore for RedisProgressStore {
    async fn load(&self, key: &AttemptKey) -> StoreResult<Option<AttemptProgress>> {
        let cache_key = Self::progress_key(key);
        let retry_cfg = RetryConfig::default();

        let cached: Option<String> = retry_async(&retry_cfg, || async {
            let mut conn = self.redis.clone();
            redis::cmd("GET")
                .arg(&cache_key)
                .query_async(&mut conn)
                .await
                .context("Failed to load attempt progress")
        })
        .await
        .map_err(AttemptError::Storage)?;

        match cached {
            Some(json) => {
                let progress: AttemptProgress = serde_json::from_str(&json)
                    .context("Failed to deserialize attempt progress")?;
                Ok(Some(progress))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, progress: &AttemptProgress) -> StoreResult<()> {
        let cache_key = Self::progress_key(&progress.key());
        let json =
            serde_json::to_string(progress).context("Failed to serialize attempt progress")?;
        let retry_cfg = RetryConfig::default();

        retry_async(&retry_cfg, || async {
            let mut conn = self.redis.clone();
            redis::cmd("SETEX")
                .arg(&cache_key)
                .arg(self.ttl_seconds)
                .arg(&json)
                .query_async::<()>(&mut conn)
                .await
                .context("Failed to save attempt progress")
        })
        .await
        .map_err(AttemptError::Storage)?;

        Ok(())
    }

    async fn clear(&self, key: &AttemptKey) -> StoreResult<()> {
        let mut conn = self.redis.clone();
        redis::cmd("DEL")
            .arg(Self::progress_key(key))
            .query_async::<()>(&mut conn)
            .await
            .context("Failed to clear attempt progress")?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.redis.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .context("Redis ping failed")?;
        Ok(())
    }
}
