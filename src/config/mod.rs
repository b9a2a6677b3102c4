use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub qa: QaConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub qc: QcConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Extractive QA service configuration
#[derive(Debug, Clone)]
pub struct QaConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// QC pipeline configuration
#[derive(Debug, Clone)]
pub struct QcConfig {
    pub claim_source: ClaimSource,
}

/// Where the QC fetch step obtains claim identifiers from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimSource {
    /// Derive synthetic claim tokens from the case identifier
    Synthetic,
    /// Look claims up in the records database
    Records,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/caseflow.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let qa = QaConfig {
            base_url: env::var("QA_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string()),
            api_key: env::var("QA_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env::var("QA_MODEL")
                .unwrap_or_else(|_| "distilbert-base-cased-distilled-squad".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        };

        let qc = QcConfig {
            claim_source: match env::var("QC_CLAIM_SOURCE")
                .unwrap_or_else(|_| "synthetic".to_string())
                .to_lowercase()
                .as_str()
            {
                "records" => ClaimSource::Records,
                _ => ClaimSource::Synthetic,
            },
        };

        Ok(Config {
            database,
            qa,
            logging,
            request,
            qc,
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 0,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            claim_source: ClaimSource::Synthetic,
        }
    }
}
