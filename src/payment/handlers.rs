use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::callback::{interpret, PaymentCallback, PaymentStatusView};
use crate::{
    auth::{extractors::OptionalSession, services::resolve_auth_state},
    error::AppError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/payment-status", get(payment_status))
}

/// Public page: anonymous visitors get the outcome, signed-in users also get the payment recorded.
#[instrument(skip(state, session))]
pub async fn payment_status(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    Query(callback): Query<PaymentCallback>,
) -> Result<Json<PaymentStatusView>, AppError> {
    let user = match session {
        Some(session) => resolve_auth_state(&state, session).await.0.user().cloned(),
        None => None,
    };
    let view = interpret(state.store.as_ref(), user.as_ref().map(|u| u.id.as_str()), &callback).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::state::AppState;
    use crate::testing::{author, logged_in, request, send};

    #[tokio::test]
    async fn anonymous_success_is_reported_but_not_recorded() {
        let app = super::routes().with_state(AppState::fake());
        let (status, body) = send(
            app,
            request(
                Method::GET,
                "/payment-status?error_code=0&merchant_trans_id=service_ai-document_4",
                None,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["redirect"], "/ai-document-utilities");
        assert_eq!(body["recorded"], false);
    }

    #[tokio::test]
    async fn signed_in_success_is_recorded_once() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), author()).await;
        let app = super::routes().with_state(state.clone());
        let uri = "/payment-status?error_code=0&merchant_trans_id=article_9_1718000000";

        let (_, body) = send(app.clone(), request(Method::GET, uri, Some(&token), None)).await;
        assert_eq!(body["recorded"], true);
        let (_, body) = send(app, request(Method::GET, uri, Some(&token), None)).await;
        assert_eq!(body["recorded"], false);

        let rows = state.store.completed_payments(&author().id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn missing_code_is_an_error() {
        let app = super::routes().with_state(AppState::fake());
        let (_, body) = send(app, request(Method::GET, "/payment-status", None, None)).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["redirect"], "/dashboard");
        assert!(body["message"].as_str().unwrap().contains("unknown"));
    }
}
