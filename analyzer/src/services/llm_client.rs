//! Azure OpenAI chat completions client using legacy function calling

use async_trait::async_trait;
use serde_json::{json, Value};

use shared::{ApiFailure, LlmConfig, LlmSettings};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::traits::LlmClient;
use crate::types::{FunctionCallRequest, FunctionCallResponse, TokenUsage};

/// Real LLM client talking to an Azure OpenAI deployment
pub struct RealLlmClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    settings: LlmSettings,
}

impl RealLlmClient {
    /// Create a client for the configured deployment
    pub fn new(config: &LlmConfig) -> AnalyzerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalyzerError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            url: format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                config.endpoint, config.deployment_name, config.api_version
            ),
            api_key: config.api_key.clone(),
            settings: config.settings.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, request: &FunctionCallRequest) -> Value {
        json!({
            "messages": request.messages,
            "functions": [request.function],
            "function_call": { "name": request.function.name },
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
            "n": self.settings.n,
        })
    }
}

#[async_trait]
impl LlmClient for RealLlmClient {
    async fn complete_function(&self, request: FunctionCallRequest) -> Result<FunctionCallResponse, ApiFailure> {
        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiFailure::Timeout
                } else {
                    ApiFailure::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ApiFailure::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        parse_function_call(&response_json)
    }
}

/// Map a non-success HTTP status (and its error body) to a failure kind
pub fn classify_error(status: u16, body: &str) -> ApiFailure {
    match status {
        400 => {
            let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
            let error = parsed.get("error");
            let code = error
                .and_then(|e| e.get("code"))
                .and_then(|c| c.as_str())
                .unwrap_or_default();
            let message = error
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or(body)
                .to_string();

            if code == "content_filter" || code == "ResponsibleAIPolicyViolation" {
                ApiFailure::ContentPolicyViolation(message)
            } else {
                ApiFailure::InvalidRequest(message)
            }
        }
        401 | 403 => ApiFailure::AuthenticationFailed,
        408 | 504 => ApiFailure::Timeout,
        429 => ApiFailure::RateLimitExceeded,
        503 => ApiFailure::ServiceUnavailable,
        other => ApiFailure::ServerError(format!("HTTP {}", other)),
    }
}

/// Pull the first choice's function call and the usage block out of a completion
pub fn parse_function_call(response_json: &Value) -> Result<FunctionCallResponse, ApiFailure> {
    let choice = response_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| ApiFailure::MalformedResponse("No choices in response".to_string()))?;

    if choice.get("finish_reason").and_then(|r| r.as_str()) == Some("content_filter") {
        return Err(ApiFailure::ContentPolicyViolation(
            "Completion was filtered".to_string(),
        ));
    }

    let function_call = choice
        .get("message")
        .and_then(|message| message.get("function_call"))
        .ok_or_else(|| ApiFailure::MalformedResponse("No function call in response".to_string()))?;

    let function_name = function_call
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or_default()
        .to_string();
    let arguments = function_call
        .get("arguments")
        .and_then(|a| a.as_str())
        .ok_or_else(|| ApiFailure::MalformedResponse("Function call has no arguments".to_string()))?
        .to_string();

    let usage = response_json.get("usage");
    let token = |field: &str| {
        usage
            .and_then(|u| u.get(field))
            .and_then(|t| t.as_u64())
            .unwrap_or(0)
    };

    Ok(FunctionCallResponse {
        function_name,
        arguments,
        usage: TokenUsage {
            prompt_tokens: token("prompt_tokens"),
            completion_tokens: token("completion_tokens"),
            total_tokens: token("total_tokens"),
        },
    })
}
