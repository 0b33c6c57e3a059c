use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;
use sqlx::types::Json;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::dto::{AuthResponse, RegisterRequest};
use crate::auth::repo_types::Session;
use crate::backend::{dto::User, endpoints, ApiError};
use crate::config::JwtConfig;
use crate::error::AppError;
use crate::guard::AuthState;
use crate::state::AppState;
use crate::validation::Validator;

/// Portal token keys.
///
/// Browser tokens carry only the portal session id as `sub`. The backend's own access and
/// refresh tokens stay in the session row, so a leaked portal token cannot be replayed
/// against the backend and logging out server-side revokes it.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub validation: Validation,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt: &JwtConfig = &state.config.jwt;
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&jwt.audience));
        validation.set_issuer(std::slice::from_ref(&jwt.issuer));
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            validation,
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            access_ttl: Duration::from_secs(jwt.ttl_minutes.max(0) as u64 * 60),
            refresh_ttl: Duration::from_secs(jwt.refresh_ttl_minutes.max(0) as u64 * 60),
        }
    }
}

impl JwtKeys {
    fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn issue(&self, session_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let issued = OffsetDateTime::now_utc();
        let expires = issued + TimeDuration::seconds(self.lifetime(kind).as_secs() as i64);
        let claims = Claims {
            sub: session_id,
            iat: issued.unix_timestamp() as usize,
            exp: expires.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(session_id = %session_id, kind = ?kind, "portal token issued");
        Ok(token)
    }

    pub fn sign_access(&self, session_id: Uuid) -> anyhow::Result<String> {
        self.issue(session_id, TokenKind::Access)
    }

    pub fn sign_refresh(&self, session_id: Uuid) -> anyhow::Result<String> {
        self.issue(session_id, TokenKind::Refresh)
    }

    /// Signature, expiry, issuer and audience only. Callers pick the kind.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        debug!(session_id = %claims.sub, kind = ?claims.kind, "portal token verified");
        Ok(claims)
    }

    fn verify_kind(&self, token: &str, expected: TokenKind) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        anyhow::ensure!(
            claims.kind == expected,
            "expected a {expected:?} token, got {:?}",
            claims.kind
        );
        Ok(claims)
    }

    /// Bearer tokens on API calls. A refresh token is refused here.
    pub fn verify_access(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify_kind(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify_kind(token, TokenKind::Refresh)
    }
}

fn issue_tokens(state: &AppState, session_id: Uuid, user: User) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(session_id)?,
        refresh_token: keys.sign_refresh(session_id)?,
        user,
    })
}

pub async fn login(state: &AppState, phone: &str, password: &str) -> Result<AuthResponse, AppError> {
    let mut check = Validator::new();
    check.phone("phone", phone).required("password", password).finish()?;

    let tokens = state.backend.login(phone.trim(), password).await?;
    let session = state
        .sessions
        .create(&tokens.access, &tokens.refresh, &tokens.user)
        .await?;
    info!(session_id = %session.id, user_id = %tokens.user.id, role = ?tokens.user.role, "user logged in");
    issue_tokens(state, session.id, tokens.user)
}

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<AuthResponse, AppError> {
    let mut check = Validator::new();
    check
        .required("name", &req.name)
        .required("surname", &req.surname)
        .phone("phone", &req.phone)
        .required("password", &req.password)
        .min_len("password", &req.password, 8)
        .finish()?;

    state
        .backend
        .register(json!({
            "name": req.name.trim(),
            "surname": req.surname.trim(),
            "phone": req.phone.trim(),
            "password": req.password,
            "role": "client",
        }))
        .await?;
    info!(phone = %req.phone.trim(), "user registered");
    login(state, &req.phone, &req.password).await
}

pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify_refresh(refresh_token).map_err(|e| {
        warn!(error = %e, "portal refresh rejected");
        AppError::Unauthorized
    })?;
    let session = state
        .sessions
        .find(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let (auth, session) = resolve_auth_state(state, session).await;
    match (auth, session) {
        (AuthState::Authenticated(user), Some(session)) => issue_tokens(state, session.id, user),
        (AuthState::Loading, _) => Err(AppError::AuthPending),
        _ => Err(AppError::Unauthorized),
    }
}

pub async fn logout(state: &AppState, session: &Session) -> Result<(), AppError> {
    state.sessions.clear(session.id).await?;
    info!(session_id = %session.id, "user logged out");
    Ok(())
}

/// Fetch the profile from the backend and cache it on the session.
pub async fn refetch_profile(state: &AppState, session: &mut Session) -> Result<User, ApiError> {
    let user: User = state.call_as(session, &endpoints::profile()).await?;
    state
        .sessions
        .update_user(session.id, &user)
        .await
        .map_err(|e| ApiError::Store(e.to_string()))?;
    session.user_data = Some(Json(user.clone()));
    Ok(user)
}

/// Turn a stored session into an auth state. The session comes back only while it is still valid.
pub async fn resolve_auth_state(state: &AppState, mut session: Session) -> (AuthState, Option<Session>) {
    if let Some(user) = session.user().cloned() {
        return (AuthState::Authenticated(user), Some(session));
    }
    match refetch_profile(state, &mut session).await {
        Ok(user) => (AuthState::Authenticated(user), Some(session)),
        Err(ApiError::SessionExpired) | Err(ApiError::Status { status: 401, .. }) => {
            if let Err(e) = state.sessions.clear(session.id).await {
                warn!(session_id = %session.id, error = %e, "failed to clear session");
            }
            (AuthState::Anonymous, None)
        }
        Err(e) => {
            warn!(session_id = %session.id, error = %e, "profile unavailable; auth state unresolved");
            (AuthState::Loading, Some(session))
        }
    }
}
