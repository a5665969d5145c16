use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{build_client, Summarizer, SummaryLength};
use crate::config::SummarizerConfig;
use crate::error::{AppError, Result};

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

/// Summarizes through an OpenAI-compatible chat completion endpoint.
pub struct OpenRouterSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenRouterSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let api_key = config
            .openrouter_api_key
            .clone()
            .ok_or_else(|| AppError::ConfigError("OPENROUTER_API_KEY is not set".to_string()))?;

        Ok(Self {
            client: build_client(config.timeout)?,
            endpoint: format!("{}/chat/completions", config.openrouter_api_url),
            api_key,
            model: config.model.clone(),
        })
    }
}

pub fn build_prompt(text: &str, length: SummaryLength) -> String {
    let mut result = String::with_capacity(text.len() + 200);
    result.push_str(&format!(
        "Summarize the following text in {} to {} words. Reply with the summary only, without quotes or any preamble:\n\n",
        length.min_length, length.max_length
    ));
    result.push_str(text);
    result
}

#[async_trait]
impl Summarizer for OpenRouterSummarizer {
    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "user".into(),
                    content: build_prompt(text, length),
                }
            ],
            temperature: 0.0,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Title", env!("CARGO_PKG_NAME"))
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(AppError::SummarizerError(format!("Chat completion returned {}: {}", status, detail)));
        }

        let json: serde_json::Value = res.json().await?;
        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::SummarizerError("Invalid response format from LLM".to_string()))?
            .to_string();

        Ok(reply)
    }

    fn backend(&self) -> &'static str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
