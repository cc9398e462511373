//! Router test helpers

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use keydeck_config::ServerConfig;
use keydeck_keys::session::SESSION_COOKIE;
use keydeck_keys::{KeyStoreBackend, MemoryKeyStore};
use keydeck_server::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub fn router_with(store: Arc<dyn KeyStoreBackend>) -> Router {
    build_router(AppState::new(store, &ServerConfig::default()))
}

pub fn app() -> (Arc<MemoryKeyStore>, Router) {
    let store = Arc::new(MemoryKeyStore::new());
    let router = router_with(store.clone());
    (store, router)
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, key));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    router
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response")
}

pub async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn is_removal(set_cookie: &str) -> bool {
    set_cookie.starts_with(&format!("{}=;", SESSION_COOKIE)) && set_cookie.contains("Max-Age=0")
}

/// Create a key through the API and return its full secret
pub async fn create_key(router: &Router, name: &str, key_type: &str) -> (String, String) {
    let response = send(
        router,
        "POST",
        "/api/keys",
        None,
        Some(serde_json::json!({ "name": name, "type": key_type })),
    )
    .await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["key"]["id"].as_str().expect("id").to_string();

    let response = send(router, "POST", &format!("/api/keys/{}/copy", id), None, None).await;
    let (_, body) = json_body(response).await;
    let secret = body["text"].as_str().expect("secret").to_string();
    (id, secret)
}
