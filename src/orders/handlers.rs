use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::instrument;

use super::{
    forms::{PrintedPublicationForm, ServiceForm},
    pricing, services,
};
use crate::{
    auth::extractors::Authorized,
    backend::endpoints,
    error::AppError,
    guard::Authors,
    multipart::{self, UPLOAD_LIMIT_BYTES},
    payment::handoff::PaymentRedirect,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/service-orders/printed-publications/quote", post(quote_printed))
        .route("/service-orders/:slug", post(create_order))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
}

#[instrument(skip(state, auth))]
pub async fn list_services(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
) -> Result<Json<Value>, AppError> {
    let mut session = auth.session;
    let body = state.call(&mut session, &endpoints::services()).await?;
    Ok(Json(body.unwrap_or(Value::Null)))
}

/// Multipart fields: `service_id` (optional), `form_data_str`, `attached_file`.
#[instrument(skip(state, auth, mp), fields(user_id = %auth.user.id))]
pub async fn create_order(
    State(state): State<AppState>,
    auth: Authorized<Authors>,
    Path(slug): Path<String>,
    mp: Multipart,
) -> Result<Json<PaymentRedirect>, AppError> {
    if !ServiceForm::SLUGS.contains(&slug.as_str()) {
        return Err(AppError::NotFound);
    }
    let incoming = multipart::collect(mp).await?;
    let mut session = auth.session;
    let redirect = services::place_order(&state, &mut session, &slug, incoming).await?;
    Ok(Json(redirect))
}

pub async fn quote_printed(
    _auth: Authorized<Authors>,
    Json(form): Json<PrintedPublicationForm>,
) -> Json<pricing::PriceQuote> {
    Json(pricing::printed_publication(&form))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use mockito::Matcher;
    use serde_json::json;

    use crate::backend::dto::Role;
    use crate::testing::{author, logged_in, multipart_request, request, send, user_with_role};

    fn app(state: crate::state::AppState) -> axum::Router {
        super::routes().with_state(state)
    }

    #[tokio::test]
    async fn missing_phone_never_reaches_backend() {
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("POST", "/service-orders/")
            .expect(0)
            .create_async()
            .await;
        let (state, token) = logged_in(&server.url(), author()).await;

        let form = json!({ "documentTitle": "Thesis" }).to_string();
        let (status, body) = send(
            app(state),
            multipart_request(
                "/service-orders/plagiarism",
                &token,
                &[("service_id", "3"), ("form_data_str", &form)],
                Some(("attached_file", "thesis.pdf", &b"%PDF-1.4"[..])),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "contactPhone");
        never.assert_async().await;
    }

    #[tokio::test]
    async fn valid_order_hands_off_to_gateway() {
        let mut server = mockito::Server::new_async().await;
        let created = server
            .mock("POST", "/service-orders/")
            .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="service_id"\r\n\r\n3"#.into()),
                Matcher::Regex("contactPhone".into()),
                Matcher::Regex(r#"filename="thesis.pdf""#.into()),
            ]))
            .with_status(201)
            .with_body(json!({ "id": 77, "payment_url": "https://my.click.uz/services/pay?x=1" }).to_string())
            .expect(1)
            .create_async()
            .await;
        let (state, token) = logged_in(&server.url(), author()).await;

        let form = json!({ "documentTitle": "Thesis", "contactPhone": "+998901234567" }).to_string();
        let (status, body) = send(
            app(state),
            multipart_request(
                "/service-orders/plagiarism",
                &token,
                &[("service_id", "3"), ("form_data_str", &form)],
                Some(("attached_file", "thesis.pdf", &b"%PDF-1.4"[..])),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect"], "https://my.click.uz/services/pay?x=1");
        created.assert_async().await;
    }

    #[tokio::test]
    async fn missing_payment_url_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/services/orcid-integration/")
            .with_status(200)
            .with_body(r#"{"id": 5, "slug": "orcid-integration"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/service-orders/")
            .match_body(Matcher::Regex(r#"name="service_id"\r\n\r\n5"#.into()))
            .with_status(201)
            .with_body(r#"{"id": 78}"#)
            .create_async()
            .await;
        let (state, token) = logged_in(&server.url(), author()).await;

        let form = json!({ "orcidId": "0000-0002-1825-0097", "contactPhone": "+998901234567" }).to_string();
        let (status, body) = send(
            app(state),
            multipart_request("/service-orders/orcid-integration", &token, &[("form_data_str", &form)], None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to obtain the payment URL");
    }

    #[tokio::test]
    async fn quote_for_authors_only() {
        let server = mockito::Server::new_async().await;
        let (state, token) = logged_in(&server.url(), author()).await;
        let payload = json!({ "bookPages": 100, "quantity": 2, "coverType": "hard", "includeISBN": true });
        let (status, body) = send(
            app(state),
            request(Method::POST, "/service-orders/printed-publications/quote", Some(&token), Some(payload.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1_330_000);

        let (state, token) = logged_in(&server.url(), user_with_role(Role::Writer)).await;
        let (status, _) = send(
            app(state),
            request(Method::POST, "/service-orders/printed-publications/quote", Some(&token), Some(payload)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_service_slug_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("GET", Matcher::Regex("^/services/".into()))
            .expect(0)
            .create_async()
            .await;
        let (state, token) = logged_in(&server.url(), author()).await;

        for path in ["/service-orders/massage", "/service-orders/..%2Fusers"] {
            let (status, _) = send(
                app(state.clone()),
                multipart_request(path, &token, &[("form_data_str", "{}")], None),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        }
        never.assert_async().await;
    }
}
