//! Embedded home page assets

use axum::http::{header, StatusCode};
use axum::response::Response;
use rust_embed::RustEmbed;

use crate::error::{WebServerError, WebServerResult};
use crate::traits::FileManager;

/// Assets compiled into the binary
#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

/// Real file manager serving the embedded assets
#[derive(Clone, Default)]
pub struct RealFileManager;

impl RealFileManager {
    pub fn new() -> Self {
        Self
    }

    fn normalize_path(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() || path == "index" {
            "index.html".to_string()
        } else {
            path.to_string()
        }
    }

    fn cache_control(path: &str) -> &'static str {
        if path.ends_with(".html") {
            "no-cache"
        } else {
            "public, max-age=3600"
        }
    }
}

#[async_trait::async_trait]
impl FileManager for RealFileManager {
    async fn serve_file(&self, path: &str) -> WebServerResult<Response> {
        let normalized_path = self.normalize_path(path);
        if normalized_path.split('/').any(|segment| segment == "..") {
            return Err(WebServerError::StaticFileNotFound { path: path.to_string() });
        }

        let content = StaticAssets::get(&normalized_path).ok_or_else(|| WebServerError::StaticFileNotFound {
            path: normalized_path.clone(),
        })?;

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, self.get_content_type(&normalized_path))
            .header(header::CACHE_CONTROL, Self::cache_control(&normalized_path))
            .body(axum::body::Body::from(content.data))
            .map_err(|e| WebServerError::ResponseError(e.to_string()))
    }

    fn get_content_type(&self, path: &str) -> String {
        let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("html") => "text/html; charset=utf-8",
            Some("css") => "text/css; charset=utf-8",
            Some("js") => "application/javascript; charset=utf-8",
            Some("json") => "application/json; charset=utf-8",
            Some("png") => "image/png",
            Some("svg") => "image/svg+xml",
            Some("ico") => "image/x-icon",
            _ => "application/octet-stream",
        }
        .to_string()
    }
}
