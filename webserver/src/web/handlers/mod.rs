//! HTTP request handlers

pub mod api;
pub mod docs;
pub mod static_files;

pub use api::{ask_viridium_ai, health_check, retry_ask_viridium_ai, ApiResponse, AskRequest, RetryRequest};
pub use docs::{swagger_json, swagger_ui};
pub use static_files::{root_redirect, serve_index, serve_static};
