use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use time::UtcOffset;

use crate::nutrition::Tolerances;

pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-flash-latest",
    "gemini-pro-latest",
    "gemini-2.0-flash",
    "gemini-2.5-flash-lite",
];

pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub models: Vec<String>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl GeminiConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    pub calorie_tolerance: f64,
    pub macro_tolerance: f64,
}

impl ReconcileConfig {
    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            calories: self.calorie_tolerance,
            macro_grams: self.macro_tolerance,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub gemini: GeminiConfig,
    pub storage: StorageConfig,
    pub reconcile: ReconcileConfig,
    /// Wall-clock offset used for meal types and day boundaries.
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?,
            base_url: std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_BASE.into()),
            models: std::env::var("GEMINI_MODELS")
                .ok()
                .map(|v| parse_models(&v))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|s| s.to_string()).collect()),
            retries: env_or("LLM_RETRIES", 1),
            retry_delay_ms: env_or("LLM_RETRY_DELAY_MS", 1000),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".into()),
            region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
            bucket: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "platewise".into()),
            access_key: std::env::var("MINIO_ACCESS_KEY").context("MINIO_ACCESS_KEY is not set")?,
            secret_key: std::env::var("MINIO_SECRET_KEY").context("MINIO_SECRET_KEY is not set")?,
        };
        let reconcile = ReconcileConfig {
            calorie_tolerance: env_or("RECONCILE_CALORIE_TOLERANCE", 50.0),
            macro_tolerance: env_or("RECONCILE_MACRO_TOLERANCE", 5.0),
        };
        Ok(Self {
            database_url,
            gemini,
            storage,
            reconcile,
            utc_offset_minutes: env_or("APP_UTC_OFFSET_MINUTES", 0),
        })
    }

    pub fn utc_offset(&self) -> UtcOffset {
        UtcOffset::from_whole_seconds(self.utc_offset_minutes * 60).unwrap_or(UtcOffset::UTC)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_list() {
        assert_eq!(
            parse_models(" gemini-2.5-flash, ,gemini-2.0-flash "),
            vec!["gemini-2.5-flash".to_string(), "gemini-2.0-flash".to_string()]
        );
        assert!(parse_models(" , ").is_empty());
    }

    #[test]
    fn offset_out_of_range_falls_back_to_utc() {
        let mut cfg = crate::state::AppState::fake().config.as_ref().clone();
        cfg.utc_offset_minutes = 330;
        assert_eq!(cfg.utc_offset().whole_minutes(), 330);
        cfg.utc_offset_minutes = 100_000;
        assert_eq!(cfg.utc_offset(), UtcOffset::UTC);
    }
}
