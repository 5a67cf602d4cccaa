//! Webserver library for the Ask Viridium AI service
//!
//! Exposes the PFAS analysis pipeline over HTTP, together with an embedded
//! home page and an OpenAPI description of the API.

pub mod error;
pub mod openapi;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use types::MaterialAssessment;
pub use webserver_impl::WebServer;
pub use web::handlers::{ApiResponse, AskRequest, RetryRequest};

// Re-export trait definitions
pub use traits::{FileManager, MaterialAnalyzer};

// Re-export service implementations
pub use services::{PipelineAnalyzer, RealFileManager};
