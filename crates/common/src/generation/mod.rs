//! Answer generation against an external LLM
//!
//! The generator is a stateless single-turn text completion behind the
//! [`Generator`] trait: an OpenAI-compatible chat-completions client for
//! deployments and a recording mock for tests. Grounding is enforced by the
//! prompt, not by the client.

mod prompt;

pub use prompt::build_prompt;

use crate::config::GenerationConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Trait for text generation backends
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier for logging and metrics
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-compatible chat-completions client.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
            message: "generation.api_key is required for the http provider".to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Generation {
                message: format!("Generation request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation {
                message: format!("Generation API error {}: {}", status, body),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| AppError::Generation {
            message: format!("Invalid generation response: {}", e),
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Generation {
                message: "Generation response contained no choices".to_string(),
            })?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let result = self.request(prompt).await;
        crate::metrics::record_generation(
            start.elapsed().as_secs_f64(),
            &self.model,
            result.is_ok(),
        );
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock generator for tests. Records every prompt it receives and returns a
/// fixed response, so tests can assert on what the pipeline sent it.
pub struct MockGenerator {
    response: String,
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl MockGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A generator whose every call fails.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Prompts received so far, in call order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("mock answer")
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(AppError::Generation {
                message: "mock generation failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Create a generator based on configuration
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpGenerator::new(config)?)),
        "mock" => Ok(Arc::new(MockGenerator::default())),
        other => Err(AppError::Configuration {
            message: format!("Unknown generation provider: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_prompts() {
        let generator = MockGenerator::new("fixed");
        let answer = generator.generate("first prompt").await.unwrap();
        assert_eq!(answer, "fixed");

        generator.generate("second prompt").await.unwrap();
        let prompts = generator.recorded_prompts();
        assert_eq!(prompts, vec!["first prompt", "second prompt"]);
    }

    #[tokio::test]
    async fn test_failing_mock_returns_error() {
        let generator = MockGenerator::failing();
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("mock generation failure"));
    }

    #[test]
    fn test_create_generator_rejects_unknown_provider() {
        let mut config = GenerationConfig::default();
        config.provider = "carrier-pigeon".to_string();
        assert!(create_generator(&config).is_err());
    }
}
