//! Service configuration loaded from the environment
//!
//! Values come from process environment variables, with a `.env` file in the
//! working directory loaded first when present. Binaries build one
//! [`AppConfig`] at startup and hand the relevant pieces to each component.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{SharedError, SharedResult};

/// Connection details for the Azure OpenAI deployment
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment_name: String,
    pub model_name: String,
    pub api_version: String,
    pub timeout: Duration,
    pub settings: LlmSettings,
}

/// Sampling parameters sent with every chat completion
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Number of candidate completions requested; only the first is used
    pub n: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 800,
            n: 3,
        }
    }
}

/// HTTP listener and API surface settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_version: String,
    pub swagger_endpoint: String,
}

/// Where prompt templates are read from and results are written to
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub prompt_dir: PathBuf,
}

impl StorageConfig {
    pub fn json_log_path(&self) -> PathBuf {
        self.data_dir.join("data.json")
    }

    pub fn csv_log_path(&self) -> PathBuf {
        self.data_dir.join("query_log.csv")
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Maximum concurrent pipeline runs in batch mode
    pub worker_threads: usize,
    pub log_level: String,
}

impl AppConfig {
    /// Load `.env` (if any) and read configuration from the process environment
    pub fn from_env() -> SharedResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SharedError::MissingConfig { key: key.to_string() })
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_secs = parse_number::<u64>("LLM_TIMEOUT_SECS", &or_default("LLM_TIMEOUT_SECS", "120"))?;
        let port = parse_number::<u16>("WEBSITES_PORT", &or_default("WEBSITES_PORT", "8000"))?;
        let worker_threads = parse_number::<usize>("NoOfThreads", &or_default("NoOfThreads", "20"))?;
        if worker_threads == 0 {
            return Err(SharedError::InvalidConfig {
                field: "NoOfThreads".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            llm: LlmConfig {
                endpoint: required("AZURE_OPENAI_ENDPOINT")?.trim_end_matches('/').to_string(),
                api_key: required("AZURE_OPENAI_API_KEY")?,
                deployment_name: required("AZURE_DEPLOYMENT_NAME")?,
                model_name: or_default("AZURE_MODEL_NAME", "gpt-4"),
                api_version: or_default("OPENAI_API_VERSION", "2024-02-01"),
                timeout: Duration::from_secs(timeout_secs),
                settings: LlmSettings::default(),
            },
            server: ServerConfig {
                host: or_default("HOST", "0.0.0.0"),
                port,
                api_version: "/v1".to_string(),
                swagger_endpoint: or_default("SwaggerEndpoint", "/api/docs"),
            },
            storage: StorageConfig {
                data_dir: PathBuf::from(or_default("DATA_DIR", "data_dump")),
                prompt_dir: PathBuf::from(or_default("PROMPT_DIR", "prompts")),
            },
            worker_threads,
            log_level: or_default("LOG_LEVEL", "info"),
        })
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> SharedResult<T> {
    value.trim().parse().map_err(|_| SharedError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
    })
}
