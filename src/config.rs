use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_HF_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_OPENROUTER_MODEL: &str = "deepseek/deepseek-chat-v3-0324";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummarizerBackend {
    HuggingFace,
    OpenRouter,
}

impl FromStr for SummarizerBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(SummarizerBackend::HuggingFace),
            "openrouter" => Ok(SummarizerBackend::OpenRouter),
            other => Err(AppError::ConfigError(format!("Unknown summarizer backend: {}", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub cors_origins: CorsOrigins,
    pub context_radius: usize,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
    pub summarizer: SummarizerConfig,
}

#[derive(Clone, Debug)]
pub struct SummarizerConfig {
    pub backend: SummarizerBackend,
    pub model: String,
    pub timeout: Duration,
    pub hf_api_url: String,
    pub hf_api_token: Option<String>,
    pub openrouter_api_url: String,
    pub openrouter_api_key: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, applying defaults
    /// for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = get("PORT").unwrap_or_else(|| "8000".to_string());
        let port = port.trim().parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(host.trim()).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;
        let server_addr = SocketAddr::new(ip, port);

        let cors_origins = parse_origins(&get("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "http://localhost:3000".to_string()))?;

        let context_radius = parse_number(get("CONTEXT_RADIUS"), "CONTEXT_RADIUS", 100)?;
        let request_timeout = Duration::from_secs(parse_number(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 90)?);

        let log_format = match get("LOG_FORMAT").map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(AppError::ConfigError(format!("Unknown log format: {}", other))),
        };

        let backend = match get("SUMMARIZER_BACKEND") {
            Some(value) => value.parse()?,
            None => SummarizerBackend::HuggingFace,
        };
        let model = get("SUMMARIZER_MODEL").unwrap_or_else(|| match backend {
            SummarizerBackend::HuggingFace => DEFAULT_HF_MODEL.to_string(),
            SummarizerBackend::OpenRouter => DEFAULT_OPENROUTER_MODEL.to_string(),
        });
        let openrouter_api_key = get("OPENROUTER_API_KEY");
        if backend == SummarizerBackend::OpenRouter && openrouter_api_key.is_none() {
            return Err(AppError::ConfigError("OPENROUTER_API_KEY is required for the openrouter backend".to_string()));
        }

        let summarizer = SummarizerConfig {
            backend,
            model,
            timeout: Duration::from_secs(parse_number(get("SUMMARIZER_TIMEOUT_SECS"), "SUMMARIZER_TIMEOUT_SECS", 60)?),
            hf_api_url: trim_url(get("HF_API_URL").unwrap_or_else(|| "https://api-inference.huggingface.co".to_string())),
            hf_api_token: get("HF_API_TOKEN"),
            openrouter_api_url: trim_url(get("OPENROUTER_API_URL").unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string())),
            openrouter_api_key,
        };

        Ok(Config {
            server_addr,
            cors_origins,
            context_radius,
            request_timeout,
            log_format,
            summarizer,
        })
    }
}

fn parse_number<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.trim().parse::<T>().map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn parse_origins(value: &str) -> Result<CorsOrigins> {
    let origins: Vec<String> = value
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if origins.iter().any(|o| o == "*") {
        return Ok(CorsOrigins::Any);
    }
    if origins.is_empty() {
        return Err(AppError::ConfigError("CORS_ALLOWED_ORIGINS is empty".to_string()));
    }
    Ok(CorsOrigins::List(origins))
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_browser_client_setup() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.cors_origins, CorsOrigins::List(vec!["http://localhost:3000".to_string()]));
        assert_eq!(config.context_radius, 100);
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.summarizer.backend, SummarizerBackend::HuggingFace);
        assert_eq!(config.summarizer.model, DEFAULT_HF_MODEL);
        assert_eq!(config.summarizer.hf_api_token, None);
    }

    #[test]
    fn port_and_origins_are_read_from_the_environment() {
        let config = load(&[
            ("PORT", "9100"),
            ("HOST", "127.0.0.1"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test/, http://b.test"),
            ("HF_API_URL", "http://localhost:1234/"),
        ])
        .unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:9100".parse().unwrap());
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert_eq!(config.summarizer.hf_api_url, "http://localhost:1234");
    }

    #[test]
    fn wildcard_origin_allows_any() {
        let config = load(&[("CORS_ALLOWED_ORIGINS", "*")]).unwrap();
        assert_eq!(config.cors_origins, CorsOrigins::Any);
    }

    #[test]
    fn openrouter_backend_requires_a_key() {
        let err = load(&[("SUMMARIZER_BACKEND", "openrouter")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let config = load(&[("SUMMARIZER_BACKEND", "OpenRouter"), ("OPENROUTER_API_KEY", "k")]).unwrap();
        assert_eq!(config.summarizer.backend, SummarizerBackend::OpenRouter);
        assert_eq!(config.summarizer.model, DEFAULT_OPENROUTER_MODEL);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("HOST", "not-an-ip")]).is_err());
        assert!(load(&[("CONTEXT_RADIUS", "-3")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(load(&[("SUMMARIZER_BACKEND", "gpt")]).is_err());
    }
}
