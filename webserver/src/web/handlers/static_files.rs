//! Static file serving handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use shared::{process_debug, process_error, ProcessId};

use crate::error::WebServerError;
use crate::traits::{FileManager, MaterialAnalyzer};
use crate::webserver_impl::WebServer;

/// Send `/` to the versioned home page
pub async fn root_redirect<A, F>(State(server): State<WebServer<A, F>>) -> Redirect
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    Redirect::to(&server.state().api_path("/"))
}

/// Serve the home page
pub async fn serve_index<A, F>(State(server): State<WebServer<A, F>>) -> Response
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    match server.file_manager().serve_file("index.html").await {
        Ok(response) => response,
        Err(e) => {
            process_error!(ProcessId::current(), "❌ Failed to serve home page: {}", e);
            let html = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Ask Viridium AI</title></head>
<body>
    <h1>Ask Viridium AI</h1>
    <p>The home page is unavailable. The API is still reachable under <code>/v1</code>.</p>
</body>
</html>"#;
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
        }
    }
}

/// Serve embedded assets under `static/`
pub async fn serve_static<A, F>(State(server): State<WebServer<A, F>>, Path(path): Path<String>) -> Response
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    match server.file_manager().serve_file(&path).await {
        Ok(response) => response,
        Err(WebServerError::StaticFileNotFound { path }) => {
            process_debug!(ProcessId::current(), "Static asset not found: {}", path);
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            process_error!(ProcessId::current(), "❌ Failed to serve {}: {}", path, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
