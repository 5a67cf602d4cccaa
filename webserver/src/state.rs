//! Webserver state management

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde_json::Value;
use shared::ServerConfig;

use crate::error::{WebServerError, WebServerResult};
use crate::openapi;

/// Core webserver state
#[derive(Debug)]
pub struct WebServerState {
    pub bind_address: SocketAddr,
    /// Versioned API prefix, e.g. `/v1`
    pub api_prefix: String,
    pub swagger_endpoint: String,
    /// OpenAPI document served at `/api/swagger.json`
    pub openapi: Value,

    pub requests_handled: AtomicU64,
    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(config: &ServerConfig) -> WebServerResult<Self> {
        let bind_address: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| WebServerError::ServerStartup(format!("Invalid bind address {}:{}: {}", config.host, config.port, e)))?;

        let api_prefix = normalize_prefix(&config.api_version);
        if api_prefix.is_empty() {
            return Err(WebServerError::ServerStartup("API version prefix must not be empty".to_string()));
        }
        let swagger_endpoint = normalize_prefix(&config.swagger_endpoint);
        if clashes_with_builtin_route(&swagger_endpoint, &api_prefix) {
            return Err(WebServerError::ServerStartup(format!(
                "Swagger endpoint {:?} clashes with a built-in route",
                config.swagger_endpoint
            )));
        }

        Ok(Self {
            bind_address,
            openapi: openapi::openapi_document(&api_prefix),
            api_prefix,
            swagger_endpoint,
            requests_handled: AtomicU64::new(0),
            server_start_time: Instant::now(),
        })
    }

    /// Full path of a route under the API prefix
    pub fn api_path(&self, route: &str) -> String {
        format!("{}{}", self.api_prefix, route)
    }

    pub fn record_request(&self) -> u64 {
        self.requests_handled.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn uptime(&self) -> Duration {
        self.server_start_time.elapsed()
    }
}

/// Routes the router always registers: `/`, the API prefix tree and the document path
fn clashes_with_builtin_route(endpoint: &str, api_prefix: &str) -> bool {
    endpoint.is_empty()
        || endpoint == openapi::DOCUMENT_PATH
        || endpoint == api_prefix
        || endpoint.starts_with(&format!("{}/", api_prefix))
}

/// `v1/` and `/v1` both become `/v1`
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_config(host: &str, port: u16) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            port,
            api_version: "/v1".to_string(),
            swagger_endpoint: "/api/docs".to_string(),
        }
    }

    #[test]
    fn test_state_from_config() {
        let state = WebServerState::new(&server_config("127.0.0.1", 8000)).unwrap();
        assert_eq!(state.bind_address.port(), 8000);
        assert_eq!(state.api_path("/health"), "/v1/health");
        assert_eq!(state.swagger_endpoint, "/api/docs");
        assert_eq!(state.record_request(), 1);
        assert_eq!(state.record_request(), 2);
    }

    #[test]
    fn test_invalid_host_rejected() {
        let err = WebServerState::new(&server_config("not a host", 8000)).unwrap_err();
        assert!(matches!(err, WebServerError::ServerStartup(_)));
    }

    #[test]
    fn test_swagger_endpoint_clash_rejected() {
        let mut config = server_config("127.0.0.1", 8000);
        config.swagger_endpoint = "/api/swagger.json".to_string();
        assert!(WebServerState::new(&config).is_err());
    }

    #[test]
    fn test_swagger_endpoint_inside_api_prefix_rejected() {
        for endpoint in ["/", "/v1", "/v1/health", "v1/static/docs"] {
            let mut config = server_config("127.0.0.1", 8000);
            config.swagger_endpoint = endpoint.to_string();
            let err = WebServerState::new(&config).unwrap_err();
            assert!(matches!(err, WebServerError::ServerStartup(_)), "endpoint {}", endpoint);
        }

        let mut config = server_config("127.0.0.1", 8000);
        config.swagger_endpoint = "/v10/docs".to_string();
        assert!(WebServerState::new(&config).is_ok());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("v1/"), "/v1");
        assert_eq!(normalize_prefix("/v1"), "/v1");
        assert_eq!(normalize_prefix("/"), "");
    }
}
