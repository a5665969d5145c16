pub mod api;
pub mod config;
pub mod dates;
pub mod detector;
pub mod error;
pub mod logging;
pub mod summarizer;

use std::sync::Arc;
use config::Config;
use dates::DateFinder;
use error::Result;
use summarizer::{build_summarizer, Summarizer};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summarizer: Arc<dyn Summarizer>,
    pub finder: DateFinder,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let summarizer = build_summarizer(&config.summarizer)?;
        Ok(Self::with_summarizer(config, summarizer))
    }

    pub fn with_summarizer(config: Config, summarizer: Arc<dyn Summarizer>) -> Self {
        AppState {
            config: Arc::new(config),
            summarizer,
            finder: DateFinder::new(),
        }
    }
}
