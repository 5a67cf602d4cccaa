//! WebServer-specific error types

use thiserror::Error;
use analyzer::AnalyzerError;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("Invalid request format: {details}")]
    InvalidRequest { details: String },

    #[error("Missing parameters: {0:?}")]
    MissingParameters(Vec<String>),

    #[error("Static file not found: {path}")]
    StaticFileNotFound { path: String },

    #[error("Response building error: {0}")]
    ResponseError(String),

    #[error("Analysis failed: {0}")]
    Analyzer(#[from] AnalyzerError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type WebServerResult<T> = Result<T, WebServerError>;
