use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_client, Summarizer, SummaryLength};
use crate::config::SummarizerConfig;
use crate::error::{AppError, Result};

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
    options: Options,
}

#[derive(Serialize)]
struct Parameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Summaries(Vec<Summary>),
    Failure { error: String },
}

#[derive(Deserialize)]
struct Summary {
    summary_text: String,
}

/// Calls a summarization model hosted behind the Hugging Face inference API.
pub struct HuggingFaceSummarizer {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    model: String,
}

impl HuggingFaceSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout)?,
            endpoint: format!("{}/models/{}", config.hf_api_url, config.model),
            api_token: config.hf_api_token.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String> {
        let body = InferenceRequest {
            inputs: text,
            parameters: Parameters {
                min_length: length.min_length,
                max_length: length.max_length,
                do_sample: false,
            },
            options: Options { wait_for_model: true },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let res = request.send().await?;
        let status = res.status();
        let payload = res.text().await?;

        let parsed = serde_json::from_str::<InferenceResponse>(&payload);
        if !status.is_success() {
            let detail = match parsed {
                Ok(InferenceResponse::Failure { error }) => error,
                _ => payload,
            };
            return Err(AppError::SummarizerError(format!("Inference API returned {}: {}", status, detail)));
        }

        match parsed {
            Ok(InferenceResponse::Summaries(summaries)) => summaries
                .into_iter()
                .next()
                .map(|s| s.summary_text.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::SummarizerError("Inference API returned no summary".to_string())),
            Ok(InferenceResponse::Failure { error }) => Err(AppError::SummarizerError(error)),
            Err(e) => Err(AppError::SummarizerError(format!("Invalid response format from inference API: {}", e))),
        }
    }

    fn backend(&self) -> &'static str {
        "huggingface"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
