use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::instrument;

use super::actions::AvailableActions;
use super::dto::{ActionsQuery, ArticleId, ReviewNotes};
use super::services::{self, Decision};
use crate::{
    auth::extractors::Authorized,
    backend::endpoints,
    error::AppError,
    guard::{ArticleReaders, Authors, Editors},
    multipart::{self, UPLOAD_LIMIT_BYTES},
    payment::handoff::PaymentRedirect,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles).post(submit_article))
        .route("/articles/:id", get(get_article))
        .route("/articles/:id/revisions", post(submit_revision))
        .route("/articles/:id/actions", get(article_actions))
        .route("/articles/:id/request-revision", post(request_revision))
        .route("/articles/:id/reject", post(reject_article))
        .route("/articles/:id/accept", post(accept_article))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
}

#[instrument(skip(state, auth))]
pub async fn list_articles(
    State(state): State<AppState>,
    auth: Authorized<ArticleReaders>,
) -> Result<Json<Value>, AppError> {
    let mut session = auth.session;
    let body = state.call(&mut session, &endpoints::articles()).await?;
    Ok(Json(body.unwrap_or(Value::Null)))
}

#[instrument(skip(state, auth))]
pub async fn get_article(
    State(state): State<AppState>,
    auth: Authorized<ArticleReaders>,
    Path(id): Path<ArticleId>,
) -> Result<Json<Value>, AppError> {
    let mut session = auth.session;
    let body = state.call(&mut session, &endpoints::article(&id)).await?;
    Ok(Json(body.unwrap_or(Value::Null)))
}

/// Multipart fields: `title`, `abstract`, `keywords`, `journal`, `file`.
#[instrument(skip(state, auth, mp), fields(user_id = %auth.user.id))]
pub async fn submit_article(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
    mp: Multipart,
) -> Result<Json<PaymentRedirect>, AppError> {
    let incoming = multipart::collect(mp).await?;
    let mut session = auth.session;
    Ok(Json(services::submit(&state, &mut session, incoming).await?))
}

#[instrument(skip(state, auth, mp))]
pub async fn submit_revision(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
    Path(id): Path<ArticleId>,
    mp: Multipart,
) -> Result<Json<Value>, AppError> {
    let incoming = multipart::collect(mp).await?;
    let mut session = auth.session;
    Ok(Json(services::submit_revision(&state, &mut session, &id, incoming).await?))
}

#[instrument(skip(state, auth))]
pub async fn article_actions(
    State(state): State<AppState>,
    auth: Authorized<Editors>,
    Path(id): Path<ArticleId>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<AvailableActions>, AppError> {
    let mut session = auth.session;
    let actions = services::actions_for(&state, &mut session, &id, query.final_file_attached).await?;
    Ok(Json(actions))
}

#[instrument(skip(state, auth, payload))]
pub async fn request_revision(
    State(state): State<AppState>,
    auth: Authorized<Editors>,
    Path(id): Path<ArticleId>,
    Json(payload): Json<ReviewNotes>,
) -> Result<Json<Value>, AppError> {
    let mut session = auth.session;
    let decision = Decision::RequestRevision { notes: payload.notes };
    Ok(Json(services::review(&state, &mut session, &id, decision).await?))
}

#[instrument(skip(state, auth, payload))]
pub async fn reject_article(
    State(state): State<AppState>,
    auth: Authorized<Editors>,
    Path(id): Path<ArticleId>,
    Json(payload): Json<ReviewNotes>,
) -> Result<Json<Value>, AppError> {
    let mut session = auth.session;
    let decision = Decision::Reject { notes: payload.notes };
    Ok(Json(services::review(&state, &mut session, &id, decision).await?))
}

/// Multipart with the final version under `finalVersionFile`.
#[instrument(skip(state, auth, mp))]
pub async fn accept_article(
    State(state): State<AppState>,
    auth: Authorized<Editors>,
    Path(id): Path<ArticleId>,
    mp: Multipart,
) -> Result<Json<Value>, AppError> {
    let final_version = multipart::collect(mp).await?;
    let mut session = auth.session;
    let decision = Decision::Accept { final_version };
    Ok(Json(services::review(&state, &mut session, &id, decision).await?))
}
