//! Analyzer-specific data types

use serde::{Deserialize, Serialize};
use shared::{ApiFailure, LogRecord, MaterialInfo, StageUsage};

/// One message of a chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A function the model is forced to call; `parameters` is a JSON Schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Chat completion request that forces a single function call
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallRequest {
    pub messages: Vec<ChatMessage>,
    pub function: FunctionDefinition,
}

/// Token counts reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Function call returned in the first choice of a completion
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallResponse {
    pub function_name: String,
    /// Raw JSON text of the call arguments
    pub arguments: String,
    pub usage: TokenUsage,
}

/// Result of one pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Completed { value: T, usage: StageUsage },
    Degraded { reason: ApiFailure },
}

impl<T> StageOutcome<T> {
    /// Accounting for the stage; degraded stages count as zero
    pub fn usage(&self) -> StageUsage {
        match self {
            StageOutcome::Completed { usage, .. } => *usage,
            StageOutcome::Degraded { .. } => StageUsage::zero(),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            StageOutcome::Completed { value, .. } => Some(value),
            StageOutcome::Degraded { .. } => None,
        }
    }
}

/// Everything produced by one full pipeline run
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub result: MaterialInfo,
    pub chemicals: Vec<String>,
    pub record: LogRecord,
    /// Whether the record reached the result store
    pub persisted: bool,
}
