use std::time::Duration;

use bytes::Bytes;
use reqwest::{multipart, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::{repo::SessionStore, repo_types::Session};
use crate::backend::dto::{error_message, LoginResponse, RefreshResponse};
use crate::config::BackendConfig;

const GENERIC_API_ERROR: &str = "An API error occurred";
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session expired. Please log in again.")]
    SessionExpired,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("session store failure: {0}")]
    Store(String),
}

/// A file forwarded to the backend inside a multipart body.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Multipart body kept in owned form so a request can be replayed after a token refresh.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_file(&self, field: &str) -> bool {
        self.files.iter().any(|f| f.field == field)
    }

    pub fn file_part(&self, field: &str) -> Option<&FilePart> {
        self.files.iter().find(|f| f.field == field)
    }

    fn to_form(&self) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub payload: Payload,
}

impl ApiRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint, Payload::Empty)
    }

    pub fn post_json(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, endpoint, Payload::Json(body))
    }

    pub fn post_multipart(endpoint: impl Into<String>, body: MultipartBody) -> Self {
        Self::new(Method::POST, endpoint, Payload::Multipart(body))
    }

    fn new(method: Method, endpoint: impl Into<String>, payload: Payload) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            payload,
        }
    }
}

/// Client for the editorial REST backend.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn login(&self, phone: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let req = ApiRequest::post_json("/login/", json!({ "phone": phone, "password": password }));
        let body = self.call_anonymous(&req).await?;
        decode(body)
    }

    pub async fn register(&self, body: Value) -> Result<(), ApiError> {
        self.call_anonymous(&ApiRequest::post_json("/register/", body))
            .await
            .map(|_| ())
    }

    pub async fn refresh_access(&self, refresh_token: &str) -> Result<String, ApiError> {
        let req = ApiRequest::post_json("/token/refresh/", json!({ "refresh": refresh_token }));
        let body = self.call_anonymous(&req).await?;
        let refreshed: RefreshResponse = decode(body)?;
        Ok(refreshed.access)
    }

    pub async fn call_anonymous(&self, req: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let response = self.send(req, None).await?;
        read_body(response).await
    }

    /// Authenticated call. A 401 triggers one refresh and one replay with the new token.
    /// A failed refresh, or a replay that is rejected again, clears the session.
    pub async fn call(
        &self,
        sessions: &dyn SessionStore,
        session: &mut Session,
        req: &ApiRequest,
    ) -> Result<Option<Value>, ApiError> {
        let response = self.send(req, Some(&session.access_token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return read_body(response).await;
        }

        debug!(session_id = %session.id, endpoint = %req.endpoint, "backend rejected token, refreshing");
        match self.refresh_access(&session.refresh_token).await {
            Ok(access) => {
                sessions
                    .update_access_token(session.id, &access)
                    .await
                    .map_err(|e| ApiError::Store(e.to_string()))?;
                session.access_token = access;
                info!(session_id = %session.id, "backend token refreshed");
                let retried = self.send(req, Some(&session.access_token)).await?;
                if retried.status() == StatusCode::UNAUTHORIZED {
                    warn!(session_id = %session.id, "fresh token rejected; clearing session");
                    return self.expire(sessions, session).await;
                }
                read_body(retried).await
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "token refresh failed; clearing session");
                self.expire(sessions, session).await
            }
        }
    }

    async fn expire<T>(&self, sessions: &dyn SessionStore, session: &Session) -> Result<T, ApiError> {
        sessions
            .clear(session.id)
            .await
            .map_err(|e| ApiError::Store(e.to_string()))?;
        Err(ApiError::SessionExpired)
    }

    pub async fn call_as<T: DeserializeOwned>(
        &self,
        sessions: &dyn SessionStore,
        session: &mut Session,
        req: &ApiRequest,
    ) -> Result<T, ApiError> {
        let body = self.call(sessions, session, req).await?;
        decode(body)
    }

    async fn send(&self, req: &ApiRequest, bearer: Option<&str>) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, req.endpoint);
        let mut builder = self.http.request(req.method.clone(), url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &req.payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(body),
            Payload::Multipart(body) => builder.multipart(body.to_form()?),
        };
        builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

async fn read_body(response: reqwest::Response) -> Result<Option<Value>, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| error_message(&body))
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let body = body.ok_or_else(|| ApiError::Decode("empty body".into()))?;
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::MemorySessionStore;
    use crate::testing::{author, backend_for};

    async fn seeded(store: &MemorySessionStore, access: &str) -> Session {
        store.create(access, "refresh-1", &author()).await.unwrap()
    }

    #[tokio::test]
    async fn retries_once_with_refreshed_token() {
        let mut server = mockito::Server::new_async().await;
        let stale = server
            .mock("GET", "/articles/")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/token/refresh/")
            .match_body(mockito::Matcher::Json(json!({ "refresh": "refresh-1" })))
            .with_status(200)
            .with_body(r#"{"access":"fresh"}"#)
            .expect(1)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/articles/")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(r#"[{"id":1}]"#)
            .expect(1)
            .create_async()
            .await;

        let store = MemorySessionStore::default();
        let mut session = seeded(&store, "stale").await;
        let client = backend_for(&server.url());

        let body = client
            .call(&store, &mut session, &ApiRequest::get("/articles/"))
            .await
            .expect("call succeeds after refresh");

        assert_eq!(body, Some(json!([{ "id": 1 }])));
        assert_eq!(session.access_token, "fresh");
        let stored = store.find(session.id).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "fresh");
        stale.assert_async().await;
        refresh.assert_async().await;
        fresh.assert_async().await;
    }

    #[tokio::test]
    async fn failed_refresh_clears_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profile/")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("POST", "/token/refresh/")
            .with_status(401)
            .with_body(r#"{"detail":"Token is invalid or expired"}"#)
            .create_async()
            .await;

        let store = MemorySessionStore::default();
        let mut session = seeded(&store, "stale").await;
        let client = backend_for(&server.url());

        let err = client
            .call(&store, &mut session, &ApiRequest::get("/profile/"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::SessionExpired));
        assert!(store.find(session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replay_rejected_again_expires_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/notifications/")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("POST", "/token/refresh/")
            .with_status(200)
            .with_body(r#"{"access":"fresh"}"#)
            .expect(1)
            .create_async()
            .await;
        let replay = server
            .mock("GET", "/notifications/")
            .match_header("authorization", "Bearer fresh")
            .with_status(401)
            .with_body(r#"{"detail":"User is inactive"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = MemorySessionStore::default();
        let mut session = seeded(&store, "stale").await;
        let client = backend_for(&server.url());

        let err = client
            .call(&store, &mut session, &ApiRequest::get("/notifications/"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::SessionExpired));
        assert!(store.find(session.id).await.unwrap().is_none());
        replay.assert_async().await;
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/service-orders/")
            .with_status(400)
            .with_body(r#"{"detail":"Service not available."}"#)
            .create_async()
            .await;

        let client = backend_for(&server.url());
        let req = ApiRequest::post_multipart("/service-orders/", MultipartBody::new().text("service_id", "3"));
        let err = client.call_anonymous(&req).await.unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Service not available.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_falls_back_to_generic_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/journals/")
            .with_status(500)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = backend_for(&server.url());
        let err = client
            .call_anonymous(&ApiRequest::get("/journals/"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), GENERIC_API_ERROR);
    }

    #[tokio::test]
    async fn no_content_yields_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/articles/5/request_revision/")
            .with_status(204)
            .create_async()
            .await;

        let client = backend_for(&server.url());
        let body = client
            .call_anonymous(&ApiRequest::post_json("/articles/5/request_revision/", json!({ "notes": "x" })))
            .await
            .unwrap();
        assert!(body.is_none());
    }

    #[test]
    fn multipart_body_tracks_fields_and_files() {
        let body = MultipartBody::new().text("service_id", "4").file(FilePart {
            field: "attached_file".into(),
            file_name: "paper.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: Bytes::from_static(b"%PDF"),
        });
        assert_eq!(body.field("service_id"), Some("4"));
        assert!(body.has_file("attached_file"));
        assert!(!body.has_file("finalVersionFile"));
    }
}
