use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::services::{self, LiteracyReport, PlagiarismEstimate, Script};
use crate::{auth::extractors::Authorized, error::AppError, guard::Authors, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai/keywords", post(keywords))
        .route("/ai/titles", post(titles))
        .route("/ai/literacy", post(literacy))
        .route("/ai/transliterate", post(transliterate))
        .route("/ai/plagiarism", post(plagiarism))
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
}

#[derive(Debug, Deserialize)]
pub struct TitlesRequest {
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TransliterateRequest {
    #[serde(default)]
    pub text: String,
    pub target: Script,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TransliterateResponse {
    pub text: String,
}

#[instrument(skip(state, _auth, req))]
pub async fn keywords(
    State(state): State<AppState>,
    _auth: Authorized<Authors>,
    Json(req): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    let keywords = services::suggest_keywords(state.ai.as_ref(), &req.title, &req.abstract_text).await?;
    Ok(Json(KeywordsResponse { keywords }))
}

#[instrument(skip(state, _auth, req))]
pub async fn titles(
    State(state): State<AppState>,
    _auth: Authorized<Authors>,
    Json(req): Json<TitlesRequest>,
) -> Result<Json<TitlesResponse>, AppError> {
    let titles = services::suggest_titles(state.ai.as_ref(), &req.abstract_text, &req.keywords).await?;
    Ok(Json(TitlesResponse { titles }))
}

#[instrument(skip(state, _auth, req))]
pub async fn literacy(
    State(state): State<AppState>,
    _auth: Authorized<Authors>,
    Json(req): Json<TextRequest>,
) -> Result<Json<LiteracyReport>, AppError> {
    Ok(Json(services::analyze_literacy(state.ai.as_ref(), &req.text).await?))
}

#[instrument(skip(state, _auth, req))]
pub async fn transliterate(
    State(state): State<AppState>,
    _auth: Authorized<Authors>,
    Json(req): Json<TransliterateRequest>,
) -> Result<Json<TransliterateResponse>, AppError> {
    let text = services::transliterate(state.ai.as_ref(), &req.text, req.target).await?;
    Ok(Json(TransliterateResponse { text }))
}

#[instrument(skip(state, _auth, req))]
pub async fn plagiarism(
    State(state): State<AppState>,
    _auth: Authorized<Authors>,
    Json(req): Json<TextRequest>,
) -> Result<Json<PlagiarismEstimate>, AppError> {
    Ok(Json(services::estimate_plagiarism(state.ai.as_ref(), &req.text).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::ai::services::tests::FixedModel;
    use crate::backend::dto::Role;
    use crate::testing::{author, logged_in, request, send, user_with_role};

    #[tokio::test]
    async fn keywords_round_trip_through_model() {
        let server = mockito::Server::new_async().await;
        let (mut state, token) = logged_in(&server.url(), author()).await;
        state.ai = Arc::new(FixedModel::new("soil, water, climate"));
        let (status, body) = send(
            super::routes().with_state(state),
            request(
                Method::POST,
                "/ai/keywords",
                Some(&token),
                Some(json!({ "title": "Soil", "abstract": "About soil" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keywords"], json!(["soil", "water", "climate"]));
    }

    #[tokio::test]
    async fn missing_key_is_service_unavailable() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), author()).await;
        let (status, _) = send(
            super::routes().with_state(state),
            request(Method::POST, "/ai/literacy", Some(&token), Some(json!({ "text": "Some text" }))),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn empty_text_is_bad_request() {
        let server = mockito::Server::new_async().await;
        let (mut state, token) = logged_in(&server.url(), author()).await;
        state.ai = Arc::new(FixedModel::new("{}"));
        let (status, body) = send(
            super::routes().with_state(state),
            request(
                Method::POST,
                "/ai/transliterate",
                Some(&token),
                Some(json!({ "text": "", "target": "latin" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Text is required for transliteration");
    }

    #[tokio::test]
    async fn editors_cannot_use_author_tools() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), user_with_role(Role::JournalManager)).await;
        let (status, _) = send(
            super::routes().with_state(state),
            request(Method::POST, "/ai/plagiarism", Some(&token), Some(json!({ "text": "x" }))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
