//! Analyzer trait definitions for dependency injection

use async_trait::async_trait;

use shared::{ApiFailure, LogRecord};
use crate::error::AnalyzerResult;
use crate::types::{FunctionCallRequest, FunctionCallResponse};

/// Chat completion client that forces a function call
#[mockall::automock]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the request and return the first choice's function call
    async fn complete_function(&self, request: FunctionCallRequest) -> Result<FunctionCallResponse, ApiFailure>;
}

/// Append-only sink for completed query records
#[mockall::automock]
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist one record
    async fn append(&self, record: &LogRecord) -> AnalyzerResult<()>;
}
