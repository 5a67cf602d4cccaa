//! Test helper utilities for webserver integration tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use shared::ServerConfig;
use webserver::{MaterialAnalyzer, RealFileManager, WebServer};

/// Server configuration with the production defaults on a throwaway port
pub fn test_server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_version: "/v1".to_string(),
        swagger_endpoint: "/api/docs".to_string(),
    }
}

/// Webserver around the given analyzer and the embedded assets
pub fn build_server<A>(analyzer: A) -> WebServer<A, RealFileManager>
where
    A: MaterialAnalyzer + 'static,
{
    WebServer::new(&test_server_config(), analyzer, RealFileManager::new()).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Route one request through a freshly built router
pub async fn send<A>(server: &WebServer<A, RealFileManager>, request: Request<Body>) -> Response
where
    A: MaterialAnalyzer + 'static,
{
    server.build_router().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Status and decoded JSON body of an API call
pub async fn send_json<A>(server: &WebServer<A, RealFileManager>, request: Request<Body>) -> (StatusCode, Value)
where
    A: MaterialAnalyzer + 'static,
{
    let response = send(server, request).await;
    let status = response.status();
    let body = body_bytes(response).await;
    (status, serde_json::from_slice(&body).unwrap())
}
