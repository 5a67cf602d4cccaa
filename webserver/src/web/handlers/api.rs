//! REST API handlers
//!
//! Every endpoint answers with the same `ApiResponse` envelope. Request
//! bodies are parsed by hand so that a missing field can be reported
//! separately from a malformed one.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use analyzer::core::pipeline::format_chemical_list;
use analyzer::StageOutcome;
use shared::{process_error, process_info, process_warn, ProcessId, Query};

use crate::error::WebServerError;
use crate::traits::{FileManager, MaterialAnalyzer};
use crate::webserver_impl::WebServer;

pub const HEALTH_MESSAGE: &str = "Ask Viridium AI Service is running";
pub const SUCCESS_MESSAGE: &str = "Success";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request data";
pub const MISSING_PARAMETERS_MESSAGE: &str = "Missing required parameters";
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Upstream model request failed";

/// Response envelope shared by all API endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse {
    /// HTTP status code, repeated in the body
    pub status: u16,
    pub message: String,
    /// Endpoint-specific payload; a `MaterialInfo` on success
    pub result: Value,
    /// Names of required fields that were absent from the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_parameters: Option<Vec<String>>,
    /// Chemicals found by the composition stage; pass them back on retry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemicals: Option<Vec<String>>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, result: Value) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            result,
            missing_parameters: None,
            chemicals: None,
        }
    }

    pub fn with_chemicals(mut self, chemicals: Vec<String>) -> Self {
        self.chemicals = Some(chemicals);
        self
    }

    pub fn success<T: Serialize>(result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::new(StatusCode::OK, SUCCESS_MESSAGE, value),
            Err(e) => Self::from(WebServerError::from(e)),
        }
    }

    pub fn missing(parameters: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST.as_u16(),
            message: MISSING_PARAMETERS_MESSAGE.to_string(),
            result: Value::String(format!("Missing parameters: {}", format_chemical_list(&parameters))),
            missing_parameters: Some(parameters),
            chemicals: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<WebServerError> for ApiResponse {
    fn from(error: WebServerError) -> Self {
        match error {
            WebServerError::MissingParameters(parameters) => Self::missing(parameters),
            WebServerError::InvalidRequest { .. } => {
                Self::new(StatusCode::BAD_REQUEST, INVALID_REQUEST_MESSAGE, Value::Null)
            }
            other => {
                process_error!(ProcessId::current(), "❌ Request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE, Value::Null)
            }
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        process_info!(ProcessId::current(), "Returning API response: {} {}", self.status, self.message);
        (self.status_code(), Json(self)).into_response()
    }
}

/// Body of `POST /ask-viridium-ai`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AskRequest {
    pub material_name: String,
    #[serde(default)]
    pub manufacturer_name: Option<String>,
    #[serde(default)]
    pub work_content: Option<String>,
}

impl AskRequest {
    pub const REQUIRED: &'static [&'static str] = &["material_name"];

    pub fn into_query(self) -> Query {
        Query::new(self.material_name)
            .with_manufacturer(self.manufacturer_name)
            .with_work_content(self.work_content)
    }
}

/// Body of `POST /retry-ask-viridium-ai`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RetryRequest {
    pub material_name: String,
    /// Extra context from the user, passed to the analysis stage
    pub message: String,
    #[serde(default)]
    pub manufacturer_name: Option<String>,
    #[serde(default)]
    pub work_content: Option<String>,
    /// Chemicals found by an earlier run
    #[serde(default)]
    pub chemicals: Option<Vec<String>>,
}

impl RetryRequest {
    pub const REQUIRED: &'static [&'static str] = &["material_name", "message"];

    pub fn into_parts(self) -> (Query, Vec<String>) {
        let query = Query::new(self.material_name)
            .with_manufacturer(self.manufacturer_name)
            .with_work_content(self.work_content)
            .with_additional_info(Some(self.message));
        (query, self.chemicals.unwrap_or_default())
    }
}

/// Parse a JSON object body, reporting absent or null required fields first
pub fn parse_request<T: DeserializeOwned>(body: &[u8], required: &[&str]) -> Result<T, WebServerError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| WebServerError::InvalidRequest {
        details: e.to_string(),
    })?;

    let object = value.as_object().ok_or_else(|| WebServerError::InvalidRequest {
        details: "request body must be a JSON object".to_string(),
    })?;

    let missing: Vec<String> = required
        .iter()
        .filter(|field| object.get(**field).map_or(true, Value::is_null))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(WebServerError::MissingParameters(missing));
    }

    serde_json::from_value(value).map_err(|e| WebServerError::InvalidRequest { details: e.to_string() })
}

/// Health check endpoint
pub async fn health_check<A, F>(State(server): State<WebServer<A, F>>) -> ApiResponse
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    server.state().record_request();
    ApiResponse::new(StatusCode::OK, HEALTH_MESSAGE, Value::Null)
}

/// Run the full pipeline for one material
pub async fn ask_viridium_ai<A, F>(State(server): State<WebServer<A, F>>, body: Bytes) -> ApiResponse
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    server.state().record_request();

    let request: AskRequest = match parse_request(&body, AskRequest::REQUIRED) {
        Ok(request) => request,
        Err(e) => {
            process_warn!(ProcessId::current(), "Rejected ask request: {}", e);
            return ApiResponse::from(e);
        }
    };

    process_info!(ProcessId::current(), "🔎 Analyzing material: {}", request.material_name);
    match server.analyzer().analyze(request.into_query()).await {
        Ok(assessment) => ApiResponse::success(&assessment.result).with_chemicals(assessment.chemicals),
        Err(e) => ApiResponse::from(WebServerError::from(e)),
    }
}

/// Re-run the analysis stage with the user's follow-up message
pub async fn retry_ask_viridium_ai<A, F>(State(server): State<WebServer<A, F>>, body: Bytes) -> ApiResponse
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    server.state().record_request();

    let request: RetryRequest = match parse_request(&body, RetryRequest::REQUIRED) {
        Ok(request) => request,
        Err(e) => {
            process_warn!(ProcessId::current(), "Rejected retry request: {}", e);
            return ApiResponse::from(e);
        }
    };

    process_info!(ProcessId::current(), "🔁 Refining analysis for: {}", request.material_name);
    let (query, chemicals) = request.into_parts();
    match server.analyzer().refine(query, chemicals).await {
        Ok(StageOutcome::Completed { value, .. }) => ApiResponse::success(&value),
        Ok(StageOutcome::Degraded { reason }) => {
            process_warn!(ProcessId::current(), "⚠️ Refinement degraded: {}", reason);
            ApiResponse::new(StatusCode::BAD_GATEWAY, UPSTREAM_FAILURE_MESSAGE, Value::Null)
        }
        Err(e) => ApiResponse::from(WebServerError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_material_name() {
        let err = parse_request::<AskRequest>(b"{}", AskRequest::REQUIRED).unwrap_err();
        let response = ApiResponse::from(err);
        assert_eq!(response.status, 400);
        assert_eq!(response.message, MISSING_PARAMETERS_MESSAGE);
        assert_eq!(response.result, Value::String("Missing parameters: ['material_name']".to_string()));
        assert_eq!(response.missing_parameters, Some(vec!["material_name".to_string()]));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = parse_request::<RetryRequest>(br#"{"material_name": null}"#, RetryRequest::REQUIRED).unwrap_err();
        match err {
            WebServerError::MissingParameters(fields) => assert_eq!(fields, vec!["material_name", "message"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_bodies_are_invalid() {
        let bodies: [&[u8]; 4] = [b"not json", b"[1, 2]", br#"{"material_name": 7}"#, b""];
        for body in bodies {
            let err = parse_request::<AskRequest>(body, AskRequest::REQUIRED).unwrap_err();
            assert!(matches!(err, WebServerError::InvalidRequest { .. }), "body {:?}", body);
        }
    }

    #[test]
    fn test_ask_request_defaults() {
        let request: AskRequest = parse_request(br#"{"material_name": "PTFE"}"#, AskRequest::REQUIRED).unwrap();
        let query = request.into_query();
        assert_eq!(query.material_name, "PTFE");
        assert_eq!(query.manufacturer_name, shared::NOT_AVAILABLE);
        assert_eq!(query.additional_info, None);
    }

    #[test]
    fn test_retry_request_carries_message() {
        let body = br#"{"material_name": "PTFE", "message": "used as a gasket", "chemicals": ["PTFE"]}"#;
        let request: RetryRequest = parse_request(body, RetryRequest::REQUIRED).unwrap();
        let (query, chemicals) = request.into_parts();
        assert_eq!(query.additional_info.as_deref(), Some("used as a gasket"));
        assert_eq!(chemicals, vec!["PTFE"]);
    }

    #[test]
    fn test_missing_parameters_not_serialized_when_absent() {
        let response = ApiResponse::new(StatusCode::OK, HEALTH_MESSAGE, Value::Null);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"status": 200, "message": HEALTH_MESSAGE, "result": null}));
    }
}
