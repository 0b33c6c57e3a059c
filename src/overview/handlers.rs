use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;
use tracing::instrument;

use crate::{
    auth::extractors::Authorized,
    backend::{endpoints, ApiRequest},
    error::AppError,
    guard::{Admins, AllowedRoles, AnyUser, Finance, JournalStaff},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard-summary", get(dashboard_summary))
        .route("/journals", get(journals))
        .route("/users", get(users))
        .route("/admin/articles", get(admin_articles))
        .route("/audit-logs", get(audit_logs))
        .route("/financial-report", get(financial_report))
        .route("/system-settings", get(system_settings))
}

async fn passthrough<R: AllowedRoles>(
    state: &AppState,
    auth: Authorized<R>,
    req: ApiRequest,
) -> Result<Json<Value>, AppError> {
    let mut session = auth.session;
    let body = state.call(&mut session, &req).await?;
    Ok(Json(body.unwrap_or(Value::Null)))
}

#[instrument(skip_all)]
pub async fn dashboard_summary(
    State(state): State<AppState>,
    auth: Authorized<AnyUser>,
) -> Result<Json<Value>, AppError> {
    passthrough(&state, auth, endpoints::dashboard_summary()).await
}

#[instrument(skip_all)]
pub async fn journals(
    State(state): State<AppState>,
    auth: Authorized<JournalStaff>,
) -> Result<Json<Value>, AppError> {
    passthrough(&state, auth, endpoints::journals()).await
}

#[instrument(skip_all)]
pub async fn users(State(state): State<AppState>, auth: Authorized<Admins>) -> Result<Json<Value>, AppError> {
    passthrough(&state, auth, endpoints::users()).await
}

#[instrument(skip_all)]
pub async fn admin_articles(
    State(state): State<AppState>,
    auth: Authorized<Admins>,
) -> Result<Json<Value>, AppError> {
    passthrough(&state, auth, endpoints::admin_articles()).await
}

#[instrument(skip_all)]
pub async fn audit_logs(State(state): State<AppState>, auth: Authorized<Admins>) -> Result<Json<Value>, AppError> {
    passthrough(&state, auth, endpoints::audit_logs()).await
}

#[instrument(skip_all)]
pub async fn financial_report(
    State(state): State<AppState>,
    auth: Authorized<Finance>,
) -> Result<Json<Value>, AppError> {
    passthrough(&state, auth, endpoints::financial_report()).await
}

#[instrument(skip_all)]
pub async fn system_settings(
    State(state): State<AppState>,
    auth: Authorized<Admins>,
) -> Result<Json<Value>, AppError> {
    passthrough(&state, auth, endpoints::system_settings()).await
}
