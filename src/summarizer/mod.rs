pub mod huggingface;
pub mod openrouter;

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

use crate::config::{SummarizerBackend, SummarizerConfig};
use crate::error::{AppError, Result};

pub use huggingface::HuggingFaceSummarizer;
pub use openrouter::OpenRouterSummarizer;

/// Token bounds handed to the model for one summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLength {
    pub min_length: u32,
    pub max_length: u32,
}

impl SummaryLength {
    pub const EVENT_NAME: SummaryLength = SummaryLength { min_length: 7, max_length: 10 };
    pub const EVENT_DESCRIPTION: SummaryLength = SummaryLength { min_length: 30, max_length: 70 };
}

/// A sequence-to-sequence summarization model. Implementations never sample,
/// so the same input yields the same summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String>;

    fn backend(&self) -> &'static str;

    fn model(&self) -> &str;
}

pub fn build_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    let summarizer: Arc<dyn Summarizer> = match config.backend {
        SummarizerBackend::HuggingFace => Arc::new(HuggingFaceSummarizer::new(config)?),
        SummarizerBackend::OpenRouter => Arc::new(OpenRouterSummarizer::new(config)?),
    };
    tracing::info!(backend = summarizer.backend(), model = summarizer.model(), "Summarizer ready");
    Ok(summarizer)
}

// Shared by both backends; one client per summarizer reuses connections.
fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}
