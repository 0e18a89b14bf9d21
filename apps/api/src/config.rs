use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Required only when `generate_embeddings` is on.
    pub openai_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,

    // Feature flags
    pub enable_ocr: bool,
    pub enable_table_extraction: bool,
    pub enable_link_extraction: bool,
    pub generate_embeddings: bool,

    // Provider resilience
    pub max_retries: u32,
    pub request_timeout: Duration,
    pub ocr_timeout: Duration,
    /// Width of the process-wide admission gate for provider calls.
    pub max_concurrent_extractions: usize,

    // Upload and input budgets
    pub max_file_size: usize,
    /// Normalized text beyond this is truncated before the provider
    /// call, never silently over-sent.
    pub max_input_chars: usize,
    /// Pages with fewer native characters than this qualify for OCR.
    pub min_native_chars: usize,

    pub fresher_threshold_months: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let generate_embeddings = env_bool("GENERATE_EMBEDDINGS", false);
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        if generate_embeddings && openai_api_key.is_none() {
            anyhow::bail!("GENERATE_EMBEDDINGS is on but OPENAI_API_KEY is not set");
        }

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            openai_api_key,
            port: env_parse("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            enable_ocr: env_bool("ENABLE_OCR", true),
            enable_table_extraction: env_bool("ENABLE_TABLE_EXTRACTION", true),
            enable_link_extraction: env_bool("ENABLE_LINK_EXTRACTION", true),
            generate_embeddings,
            max_retries: env_parse("MAX_RETRIES", 3)?,
            request_timeout: Duration::from_secs_f64(env_parse("REQUEST_TIMEOUT", 30.0)?),
            ocr_timeout: Duration::from_secs_f64(env_parse("OCR_TIMEOUT", 20.0)?),
            max_concurrent_extractions: env_parse("MAX_CONCURRENT_EXTRACTIONS", 4)?,
            max_file_size: env_parse("MAX_FILE_SIZE", 10 * 1024 * 1024)?,
            max_input_chars: env_parse("MAX_INPUT_CHARS", 20_000)?,
            min_native_chars: env_parse("MIN_NATIVE_CHARS", 16)?,
            fresher_threshold_months: env_parse("FRESHER_THRESHOLD_MONTHS", 12)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "t" | "yes" | "y"),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .with_context(|| format!("'{key}' has an invalid value: {v}")),
        Err(_) => Ok(default),
    }
}
