//! Service trait definitions for dependency injection
//!
//! The HTTP layer only talks to these traits so handlers can be tested
//! without a model deployment or embedded assets.

use async_trait::async_trait;
use axum::response::Response;

use analyzer::{AnalyzerResult, StageOutcome};
use shared::{MaterialInfo, Query};
use crate::error::WebServerResult;
use crate::types::MaterialAssessment;

/// PFAS analysis backend used by the API handlers
#[mockall::automock]
#[async_trait]
pub trait MaterialAnalyzer: Send + Sync {
    /// Run the full two-stage pipeline and record the result
    async fn analyze(&self, query: Query) -> AnalyzerResult<MaterialAssessment>;

    /// Re-run the analysis stage with the query's additional info
    async fn refine(&self, query: Query, chemicals: Vec<String>) -> AnalyzerResult<StageOutcome<MaterialInfo>>;
}

/// Static asset lookup
#[mockall::automock]
#[async_trait]
pub trait FileManager: Send + Sync {
    /// Serve a static file by path
    async fn serve_file(&self, path: &str) -> WebServerResult<Response>;

    /// Get content type for file extension
    fn get_content_type(&self, path: &str) -> String;
}
