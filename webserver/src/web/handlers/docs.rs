//! API documentation handlers

use axum::{
    extract::State,
    response::{Html, Json},
};
use serde_json::Value;

use crate::openapi::DOCUMENT_PATH;
use crate::traits::{FileManager, MaterialAnalyzer};
use crate::webserver_impl::WebServer;

/// OpenAPI document
pub async fn swagger_json<A, F>(State(server): State<WebServer<A, F>>) -> Json<Value>
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    Json(server.state().openapi.clone())
}

/// Swagger UI page loading the OpenAPI document
pub async fn swagger_ui<A, F>(State(_server): State<WebServer<A, F>>) -> Html<String>
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    Html(swagger_page(DOCUMENT_PATH))
}

pub fn swagger_page(document_url: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Ask Viridium AI - API docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {{
            window.ui = SwaggerUIBundle({{ url: "{document_url}", dom_id: "#swagger-ui" }});
        }};
    </script>
</body>
</html>"##
    )
}
