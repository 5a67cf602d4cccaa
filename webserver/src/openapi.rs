//! OpenAPI document for the HTTP API
//!
//! Component schemas come from the Rust request and response types, so the
//! published document follows the structs the handlers actually parse.

use schemars::r#gen::SchemaSettings;
use serde_json::{json, Value};

use shared::MaterialInfo;

use crate::web::handlers::api::{ApiResponse, AskRequest, RetryRequest};

pub const OPENAPI_VERSION: &str = "3.0.2";
pub const API_TITLE: &str = "Ask Viridium AI";
pub const API_VERSION: &str = "1.0.0";
pub const DOCUMENT_PATH: &str = "/api/swagger.json";

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn json_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema_ref("ApiResponse") } }
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(schema) } }
    })
}

/// Build the document for routes mounted under `api_prefix`
pub fn openapi_document(api_prefix: &str) -> Value {
    let mut generator = SchemaSettings::openapi3().into_generator();
    generator.subschema_for::<AskRequest>();
    generator.subschema_for::<RetryRequest>();
    generator.subschema_for::<ApiResponse>();
    generator.subschema_for::<MaterialInfo>();
    let schemas = generator.take_definitions();

    let mut paths = serde_json::Map::new();
    paths.insert(
        format!("{}/", api_prefix),
        json!({
            "get": {
                "summary": "Home page",
                "responses": {
                    "200": { "description": "HTML page", "content": { "text/html": {} } }
                }
            }
        }),
    );
    paths.insert(
        format!("{}/health", api_prefix),
        json!({
            "get": {
                "summary": "Health check",
                "responses": { "200": json_response("Service is running") }
            }
        }),
    );
    paths.insert(
        format!("{}/ask-viridium-ai", api_prefix),
        json!({
            "post": {
                "summary": "Analyze a material for PFAS",
                "requestBody": json_body("AskRequest"),
                "responses": {
                    "200": json_response("Analysis result; `result` holds a MaterialInfo"),
                    "400": json_response("Invalid request data or missing parameters"),
                    "500": json_response("Unexpected error")
                }
            }
        }),
    );
    paths.insert(
        format!("{}/retry-ask-viridium-ai", api_prefix),
        json!({
            "post": {
                "summary": "Re-run the PFAS analysis with additional information",
                "requestBody": json_body("RetryRequest"),
                "responses": {
                    "200": json_response("Refined analysis; `result` holds a MaterialInfo"),
                    "400": json_response("Invalid request data or missing parameters"),
                    "500": json_response("Unexpected error"),
                    "502": json_response("Upstream model request failed")
                }
            }
        }),
    );

    json!({
        "openapi": OPENAPI_VERSION,
        "info": { "title": API_TITLE, "version": API_VERSION },
        "paths": paths,
        "components": { "schemas": schemas }
    })
}
