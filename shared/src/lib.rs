//! Shared types for the Ask Viridium AI service
//!
//! Holds the query/result data model, configuration loading, logging setup
//! and the error type used by both the analyzer library and the webserver.

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;

pub use config::{AppConfig, LlmConfig, LlmSettings, ServerConfig, StorageConfig};
pub use errors::*;
pub use types::*;
