use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use super::repo_types::Session;
use super::services::{resolve_auth_state, JwtKeys};
use crate::backend::dto::User;
use crate::error::AppError;
use crate::guard::{decide, AllowedRoles, AuthState, Decision};
use crate::guard::routes::LOGIN_PATH;
use crate::state::AppState;

/// Pull the bearer token out of the Authorization header, if any.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn load_session(parts: &Parts, state: &AppState) -> Result<Option<Session>, AppError> {
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };
    let claims = JwtKeys::from_ref(state).verify_access(token).map_err(|e| {
        debug!(error = %e, "portal token rejected");
        AppError::Unauthorized
    })?;
    Ok(state.sessions.find(claims.sub).await?)
}

/// A live portal session; the cached user is not checked.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        load_session(parts, state)
            .await?
            .map(CurrentSession)
            .ok_or(AppError::Unauthorized)
    }
}

/// Session if the caller sent a valid one. Bad or stale tokens degrade to anonymous.
pub struct OptionalSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match load_session(parts, state).await {
            Ok(session) => Ok(OptionalSession(session)),
            Err(AppError::Unauthorized) => Ok(OptionalSession(None)),
            Err(e) => Err(e),
        }
    }
}

/// Authenticated caller whose role is in `R`. Runs the same decision as page navigation.
pub struct Authorized<R: AllowedRoles> {
    pub session: Session,
    pub user: User,
    _roles: PhantomData<R>,
}

#[async_trait]
impl<R: AllowedRoles> FromRequestParts<AppState> for Authorized<R> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let (auth, session) = match load_session(parts, state).await? {
            Some(session) => resolve_auth_state(state, session).await,
            None => (AuthState::Anonymous, None),
        };
        match (decide(&auth, R::ACCESS), auth, session) {
            (Decision::Render, AuthState::Authenticated(user), Some(session)) => Ok(Self {
                session,
                user,
                _roles: PhantomData,
            }),
            (Decision::Loading, ..) => Err(AppError::AuthPending),
            (Decision::Redirect { target }, ..) if target == LOGIN_PATH => Err(AppError::Unauthorized),
            (Decision::Redirect { .. }, AuthState::Authenticated(user), _) => {
                debug!(user_id = %user.id, role = ?user.role, "role not allowed");
                Err(AppError::Forbidden)
            }
            _ => Err(AppError::Unauthorized),
        }
    }
}
