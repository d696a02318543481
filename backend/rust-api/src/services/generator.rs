use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::question::GeneratedQuestion;

#[derive(Debug, Serialize)]
struct GenerateQuestionsRequest<'a> {
    topic: &'a str,
    per_tier: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateQuestionsResponse {
    questions: Vec<GeneratedQuestion>,
}

/// Client for the external text-generation collaborator. The service is a
/// black-box producer of structured question records; retrying it is its
/// own concern, not the core's. Its output still has to pass the boundary
/// validation before reaching the question repository.
pub struct QuestionGenerator {
    http_client: Client,
    base_url: String,
}

impl QuestionGenerator {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }

    pub async fn generate(&self, topic: &str, per_tier: u32) -> Result<Vec<GeneratedQuestion>> {
        let url = format!("{}/internal/generate_questions", self.base_url);

        tracing::debug!(
            "Calling question generator: {} with topic={}, per_tier={}",
            url,
            topic,
            per_tier
        );

        let response = self
            .http_client
            .post(&url)
            .json(&GenerateQuestionsRequest { topic, per_tier })
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .context("Failed to call question generator")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Question generator returned error {}: {}",
                status,
                error_text
            ));
        }

        let api_response: GenerateQuestionsResponse = response
            .json()
            .await
            .context("Failed to parse question generator response")?;

        tracing::info!(
            "Generator produced {} question records for topic {}",
            api_response.questions.len(),
            topic
        );

        Ok(api_response.questions)
    }
}
