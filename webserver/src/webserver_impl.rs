//! Main webserver implementation
//!
//! `WebServer` owns the injected analyzer and file manager and wires them
//! into the axum router.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use shared::{logging, process_info, ProcessId, ServerConfig};

use crate::error::{WebServerError, WebServerResult};
use crate::openapi::DOCUMENT_PATH;
use crate::state::WebServerState;
use crate::traits::{FileManager, MaterialAnalyzer};
use crate::web::handlers::{
    ask_viridium_ai, health_check, retry_ask_viridium_ai, root_redirect, serve_index, serve_static, swagger_json,
    swagger_ui,
};

/// Main webserver struct with dependency injection
pub struct WebServer<A, F>
where
    A: MaterialAnalyzer,
    F: FileManager,
{
    state: Arc<WebServerState>,
    analyzer: Arc<A>,
    file_manager: Arc<F>,
}

// Services are shared behind Arcs, so cloning never requires A: Clone
impl<A, F> Clone for WebServer<A, F>
where
    A: MaterialAnalyzer,
    F: FileManager,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            analyzer: Arc::clone(&self.analyzer),
            file_manager: Arc::clone(&self.file_manager),
        }
    }
}

impl<A, F> WebServer<A, F>
where
    A: MaterialAnalyzer + 'static,
    F: FileManager + 'static,
{
    /// Create a new webserver with dependency injection
    pub fn new(config: &ServerConfig, analyzer: A, file_manager: F) -> WebServerResult<Self> {
        Ok(Self {
            state: Arc::new(WebServerState::new(config)?),
            analyzer: Arc::new(analyzer),
            file_manager: Arc::new(file_manager),
        })
    }

    pub fn state(&self) -> &WebServerState {
        &self.state
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn file_manager(&self) -> &F {
        &self.file_manager
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        let api = |route: &str| self.state.api_path(route);

        Router::new()
            .route("/", get(root_redirect::<A, F>))
            // Home page and assets
            .route(&self.state.api_prefix, get(serve_index::<A, F>))
            .route(&api("/"), get(serve_index::<A, F>))
            .route(&api("/static/*path"), get(serve_static::<A, F>))
            // API routes
            .route(&api("/health"), get(health_check::<A, F>))
            .route(&api("/ask-viridium-ai"), post(ask_viridium_ai::<A, F>))
            .route(&api("/retry-ask-viridium-ai"), post(retry_ask_viridium_ai::<A, F>))
            // Documentation
            .route(DOCUMENT_PATH, get(swagger_json::<A, F>))
            .route(&self.state.swagger_endpoint, get(swagger_ui::<A, F>))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.clone())
    }

    /// Serve until Ctrl+C
    pub async fn run(&self) -> WebServerResult<()> {
        let router = self.build_router();
        let bind_address = self.state.bind_address;

        let listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {}: {}", bind_address, e)))?;

        process_info!(ProcessId::current(), "🌐 Web server listening on http://{}", bind_address);
        process_info!(
            ProcessId::current(),
            "📖 API docs available at http://{}{}",
            bind_address,
            self.state.swagger_endpoint
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Server error: {}", e)))?;

        process_info!(
            ProcessId::current(),
            "Handled {} requests in {:?}",
            self.state.requests_handled.load(std::sync::atomic::Ordering::Relaxed),
            self.state.uptime()
        );
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal"),
        Err(e) => logging::log_error(ProcessId::current(), "Signal handling", &e),
    }
}
