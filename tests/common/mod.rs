#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use marketing_site::{
    AppConfig, AppState, MemoryRepository, MockStorageService, create_router,
    repository::RepositoryState, storage::StorageState,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        session_secret: TEST_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<MemoryRepository>,
    pub storage: MockStorageService,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_storage(MockStorageService::new())
    }

    pub fn with_storage(storage: MockStorageService) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let state = AppState::new(
            test_config(),
            repo.clone() as RepositoryState,
            Arc::new(storage.clone()) as StorageState,
        );
        Self {
            state,
            repo,
            storage,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }
}

/// Signs a session token for `role` expiring `exp_offset` seconds from now.
pub fn mint_token(role: &str, exp_offset: i64, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": format!("{role}-user"),
        "role": role,
        "iat": now,
        "exp": now + exp_offset,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}

pub fn admin_token() -> String {
    mint_token("admin", 3600, TEST_SECRET)
}

pub fn client_token() -> String {
    mint_token("client", 3600, TEST_SECRET)
}

pub fn session_cookie(token: &str) -> String {
    format!("session-token={token}")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, session_cookie(token))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, session_cookie(token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// A small valid editor document with a single paragraph.
pub fn paragraph_doc(text: &str) -> String {
    json!({
        "type": "doc",
        "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": text }] }]
    })
    .to_string()
}
