//! Integration tests for the HTTP API
//!
//! Requests go through the full axum router via `oneshot`; the analyzer is
//! either a mock or the real pipeline over a mocked model and a temp store.

mod fixtures;
mod helpers;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use analyzer::{AnalyzerError, CostModel, FileResultStore, MockLlmClient, PromptStore, QueryPipeline, StageOutcome};
use shared::{ApiFailure, LogRecord, Query, StageUsage};
use webserver::traits::MockMaterialAnalyzer;
use webserver::{PipelineAnalyzer, RealFileManager, WebServer};

use fixtures::*;
use helpers::*;

#[tokio::test]
async fn test_health_check() {
    let server = build_server(MockMaterialAnalyzer::new());
    let (status, body) = send_json(&server, get("/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": 200, "message": "Ask Viridium AI Service is running", "result": null})
    );
}

#[tokio::test]
async fn test_empty_body_lists_material_name() {
    let mut analyzer = MockMaterialAnalyzer::new();
    analyzer.expect_analyze().never();
    let server = build_server(analyzer);

    let (status, body) = send_json(&server, post_json("/v1/ask-viridium-ai", "{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "Missing required parameters");
    assert_eq!(body["result"], "Missing parameters: ['material_name']");
    assert_eq!(body["missing_parameters"], json!(["material_name"]));
}

#[tokio::test]
async fn test_malformed_requests_are_rejected() {
    let server = build_server(MockMaterialAnalyzer::new());

    for payload in ["{not json", "[\"Nitrogen\"]", r#"{"material_name": ["Nitrogen"]}"#] {
        let (status, body) = send_json(&server, post_json("/v1/ask-viridium-ai", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["message"], "Invalid request data");
        assert!(body.get("missing_parameters").is_none());
    }
}

#[tokio::test]
async fn test_ask_returns_material_info() {
    let mut analyzer = MockMaterialAnalyzer::new();
    analyzer
        .expect_analyze()
        .withf(|query: &Query| {
            query.material_name == NITROGEN
                && query.manufacturer_name == MATHESON
                && query.work_content == HEAT_TREATMENT
                && query.additional_info.is_none()
        })
        .times(1)
        .returning(|_| Ok(nitrogen_assessment()));
    let server = build_server(analyzer);

    let (status, body) = send_json(&server, post_json("/v1/ask-viridium-ai", &nitrogen_request_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Success");
    assert_eq!(body["result"]["analyzed_material"], NITROGEN);
    assert_eq!(body["result"]["decision"], "PFAS (No)");
    assert_eq!(body["chemicals"], json!(["Nitrogen"]));
}

#[tokio::test]
async fn test_analyzer_error_is_generic_500() {
    let mut analyzer = MockMaterialAnalyzer::new();
    analyzer.expect_analyze().returning(|_| {
        Err(AnalyzerError::TemplateError {
            template: "pfas_analysis".to_string(),
            variable: "example".to_string(),
        })
    });
    let server = build_server(analyzer);

    let (status, body) =
        send_json(&server, post_json("/v1/ask-viridium-ai", r#"{"material_name": "PTFE"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An unexpected error occurred. Please try again later.");
    assert_eq!(body["result"], Value::Null);
}

#[tokio::test]
async fn test_retry_requires_message() {
    let server = build_server(MockMaterialAnalyzer::new());
    let (status, body) =
        send_json(&server, post_json("/v1/retry-ask-viridium-ai", r#"{"material_name": "PTFE"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_parameters"], json!(["message"]));
    assert_eq!(body["result"], "Missing parameters: ['message']");
}

#[tokio::test]
async fn test_retry_passes_message_as_additional_info() {
    let mut analyzer = MockMaterialAnalyzer::new();
    analyzer
        .expect_refine()
        .withf(|query: &Query, chemicals: &Vec<String>| {
            query.additional_info.as_deref() == Some("It is a liquid gas")
                && chemicals == &vec!["Nitrogen".to_string()]
        })
        .times(1)
        .returning(|_, _| {
            Ok(StageOutcome::Completed {
                value: nitrogen_material_info(),
                usage: StageUsage::default(),
            })
        });
    let server = build_server(analyzer);

    let body = json!({
        "material_name": NITROGEN,
        "message": "It is a liquid gas",
        "chemicals": ["Nitrogen"],
    })
    .to_string();
    let (status, response) = send_json(&server, post_json("/v1/retry-ask-viridium-ai", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["decision"], "PFAS (No)");
}

#[tokio::test]
async fn test_degraded_retry_is_bad_gateway() {
    let mut analyzer = MockMaterialAnalyzer::new();
    analyzer.expect_refine().returning(|_, _| {
        Ok(StageOutcome::Degraded {
            reason: ApiFailure::RateLimitExceeded,
        })
    });
    let server = build_server(analyzer);

    let body = r#"{"material_name": "PTFE", "message": "thread sealant"}"#;
    let (status, response) = send_json(&server, post_json("/v1/retry-ask-viridium-ai", body)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(response["message"], "Upstream model request failed");
}

#[tokio::test]
async fn test_root_redirects_to_home_page() {
    let server = build_server(MockMaterialAnalyzer::new());
    let response = send(&server, get("/")).await;

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/v1/");
}

#[tokio::test]
async fn test_home_page_and_assets() {
    let server = build_server(MockMaterialAnalyzer::new());

    for uri in ["/v1", "/v1/"] {
        let response = send(&server, get(uri)).await;
        assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<title>Ask Viridium AI</title>"));
    }

    let response = send(&server, get("/v1/static/styles/main.css")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");

    let response = send(&server, get("/v1/static/styles/missing.css")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_and_swagger_ui() {
    let server = build_server(MockMaterialAnalyzer::new());

    let (status, doc) = send_json(&server, get("/api/swagger.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["openapi"], "3.0.2");
    assert_eq!(doc["info"]["title"], "Ask Viridium AI");
    assert!(doc["paths"]["/v1/ask-viridium-ai"]["post"].is_object());
    assert!(doc["components"]["schemas"]["MaterialInfo"].is_object());

    let response = send(&server, get("/api/docs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("/api/swagger.json"));
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let server = build_server(MockMaterialAnalyzer::new());
    let request = axum::http::Request::builder()
        .uri("/v1/health")
        .header(header::ORIGIN, "https://portal.example.com")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = send(&server, request).await;
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_nitrogen_query_is_answered_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("data.json");
    let csv_path = dir.path().join("query_log.csv");

    let mut llm = MockLlmClient::new();
    llm.expect_complete_function()
        .withf(|req| req.function.name == "ChemicalComposition")
        .times(1)
        .returning(|_| Ok(function_response(COMPOSITION_ARGS, 1000, 0)));
    llm.expect_complete_function()
        .withf(|req| req.function.name == "MaterialInfo")
        .times(1)
        .returning(|_| Ok(function_response(ANALYSIS_ARGS, 0, 1000)));

    let store = FileResultStore::with_paths(json_path.clone(), csv_path.clone());
    let pipeline = QueryPipeline::new(llm, store, PromptStore::builtin(), CostModel::for_model("gpt-4"));
    let server = build_server(PipelineAnalyzer::new(Arc::new(pipeline)));

    let (status, body) = send_json(&server, post_json("/v1/ask-viridium-ai", &nitrogen_request_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["decision"], "PFAS (No)");

    let records: Vec<LogRecord> = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].material, NITROGEN);
    assert_eq!(records[0].pfas_status.as_deref(), Some("PFAS (No)"));

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 2);
}

#[tokio::test]
async fn test_retry_reuses_chemicals_from_ask() {
    let dir = tempfile::tempdir().unwrap();

    let mut llm = MockLlmClient::new();
    llm.expect_complete_function()
        .withf(|req| req.function.name == "ChemicalComposition")
        .times(1)
        .returning(|_| Ok(function_response(COMPOSITION_ARGS, 1000, 0)));
    llm.expect_complete_function()
        .withf(|req| req.function.name == "MaterialInfo" && req.messages[1].content.ends_with("Additional info: None"))
        .times(1)
        .returning(|_| Ok(function_response(ANALYSIS_ARGS, 0, 1000)));
    llm.expect_complete_function()
        .withf(|req| {
            req.function.name == "MaterialInfo"
                && req.messages[1]
                    .content
                    .ends_with("is: ['Nitrogen']. Additional info: It is a liquid gas")
        })
        .times(1)
        .returning(|_| Ok(function_response(ANALYSIS_ARGS, 300, 100)));

    let store = FileResultStore::with_paths(dir.path().join("data.json"), dir.path().join("query_log.csv"));
    let pipeline = QueryPipeline::new(llm, store, PromptStore::builtin(), CostModel::for_model("gpt-4"));
    let server = build_server(PipelineAnalyzer::new(Arc::new(pipeline)));

    let (status, asked) = send_json(&server, post_json("/v1/ask-viridium-ai", &nitrogen_request_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(asked["chemicals"], json!(["Nitrogen"]));

    // Same body the home page script sends: the last query plus the message and chemicals
    let retry = json!({
        "material_name": NITROGEN,
        "manufacturer_name": MATHESON,
        "work_content": HEAT_TREATMENT,
        "message": "It is a liquid gas",
        "chemicals": asked["chemicals"],
    })
    .to_string();
    let (status, refined) = send_json(&server, post_json("/v1/retry-ask-viridium-ai", &retry)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(refined["result"]["decision"], "PFAS (No)");
    assert!(refined.get("chemicals").is_none());
}

#[tokio::test]
async fn test_custom_swagger_endpoint() {
    let mut config = test_server_config();
    config.swagger_endpoint = "/docs".to_string();
    let server = WebServer::new(&config, MockMaterialAnalyzer::new(), RealFileManager::new()).unwrap();

    let response = send(&server, get("/docs")).await;
    assert_eq!(response.status(), StatusCode::OK);

    config.swagger_endpoint = "/v1/health".to_string();
    let result = WebServer::new(&config, MockMaterialAnalyzer::new(), RealFileManager::new());
    assert!(result.is_err());
}
