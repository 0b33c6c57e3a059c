use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
        extractors::{Authorized, CurrentSession},
        services,
    },
    backend::dto::User,
    error::AppError,
    guard::AnyUser,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    services::register(&state, payload).await.map(Json)
}

#[instrument(skip(state, payload), fields(phone = %payload.phone))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    services::login(&state, &payload.phone, &payload.password)
        .await
        .map(Json)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    services::refresh(&state, &payload.refresh_token)
        .await
        .map(Json)
}

#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<StatusCode, AppError> {
    services::logout(&state, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Always refetches so role or language changes on the backend show up.
#[instrument(skip(state, auth))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: Authorized<AnyUser>,
) -> Result<Json<User>, AppError> {
    let mut session = auth.session;
    let user = services::refetch_profile(&state, &mut session).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{author, logged_in, request, send};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn me_requires_token() {
        let state = AppState::fake();
        let (status, body) = send(router_for_tests(state), request(Method::GET, "/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["redirect"], "/login");
    }

    #[tokio::test]
    async fn me_refetches_profile() {
        let mut server = mockito::Server::new_async().await;
        let mut fresh = author();
        fresh.name = "Renamed".into();
        server
            .mock("GET", "/profile/")
            .with_status(200)
            .with_body(serde_json::to_string(&fresh).unwrap())
            .expect(1)
            .create_async()
            .await;
        let (state, token) = logged_in(&server.url(), author()).await;

        let (status, body) = send(
            router_for_tests(state),
            request(Method::GET, "/me", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Renamed");
    }

    #[tokio::test]
    async fn logout_drops_session() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), author()).await;
        let app = router_for_tests(state);

        let (status, _) = send(app.clone(), request(Method::POST, "/auth/logout", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(app, request(Method::POST, "/auth/logout", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_validates_before_backend() {
        let mut server = mockito::Server::new_async().await;
        let never = server.mock("POST", "/register/").expect(0).create_async().await;
        let state = crate::testing::state_with_backend(&server.url());

        let (status, body) = send(
            router_for_tests(state),
            request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "name": "", "surname": "Karimov", "phone": "+998901112233", "password": "short" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "password"]);
        never.assert_async().await;
    }

    fn router_for_tests(state: AppState) -> Router {
        Router::new()
            .merge(auth_routes())
            .merge(me_routes())
            .with_state(state)
    }
}
