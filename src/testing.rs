//! Shared fixtures for handler and service tests.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::repo::MemorySessionStore;
use crate::auth::services::JwtKeys;
use crate::backend::dto::{Language, Role, User};
use crate::backend::BackendClient;
use crate::config::BackendConfig;
use crate::state::AppState;

const BOUNDARY: &str = "portal-test-boundary";

pub fn user_with_role(role: Role) -> User {
    User {
        id: "7".into(),
        name: "Aziza".into(),
        surname: "Karimova".into(),
        phone: "+998901112233".into(),
        email: Some("aziza@example.uz".into()),
        role,
        orcid_id: None,
        language: Language::Uz,
    }
}

/// An article author.
pub fn author() -> User {
    user_with_role(Role::Client)
}

pub fn backend_for(base_url: &str) -> BackendClient {
    BackendClient::new(&BackendConfig {
        base_url: base_url.into(),
        timeout_secs: 5,
    })
    .expect("backend client")
}

pub fn state_with_backend(base_url: &str) -> AppState {
    AppState::fake_with_backend(base_url)
}

/// State with a resolved session for `user`; the backend sees `Bearer backend-access`.
pub async fn logged_in(base_url: &str, user: User) -> (AppState, String) {
    let state = state_with_backend(base_url);
    let session = state
        .sessions
        .create("backend-access", "backend-refresh", &user)
        .await
        .expect("session");
    let token = JwtKeys::from_ref(&state)
        .sign_access(session.id)
        .expect("sign");
    (state, token)
}

/// State with a session that still needs `/profile/` before its role is known.
pub async fn unresolved_login(base_url: &str) -> (AppState, String) {
    let mut state = state_with_backend(base_url);
    let sessions = MemorySessionStore::default();
    let session = sessions
        .create_unresolved("backend-access", "backend-refresh")
        .await;
    state.sessions = Arc::new(sessions);
    let token = JwtKeys::from_ref(&state)
        .sign_access(session.id)
        .expect("sign");
    (state, token)
}

pub fn request(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// POST with a hand-built `multipart/form-data` body.
pub fn multipart_request(
    path: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

/// Runs one request; empty bodies come back as `Value::Null`.
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}
