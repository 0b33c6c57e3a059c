use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::ai::AiError;
use crate::backend::ApiError;
use crate::guard::routes::{DASHBOARD_PATH, LOGIN_PATH};
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Authentication required")]
    Unauthorized,
    #[error("You do not have access to this resource")]
    Forbidden,
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("Authentication state is not resolved yet")]
    AuthPending,
    #[error("{0}")]
    BadRequest(String),
    #[error("Failed to obtain the payment URL")]
    PaymentUrlMissing,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                debug!(fields = errors.0.len(), "validation failed");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": "Validation failed", "fields": errors.0 })),
                )
                    .into_response()
            }
            AppError::Unauthorized | AppError::Api(ApiError::SessionExpired) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": self.to_string(), "redirect": LOGIN_PATH })),
            )
                .into_response(),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": self.to_string(), "redirect": DASHBOARD_PATH })),
            )
                .into_response(),
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() }))).into_response()
            }
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            AppError::AuthPending => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::Api(ApiError::Status { status, message }) => {
                warn!(%status, %message, "backend rejected request");
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(json!({ "error": message }))).into_response()
            }
            AppError::Ai(AiError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::Ai(AiError::NotConfigured) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": AiError::NotConfigured.to_string() })),
            )
                .into_response(),
            err @ (AppError::PaymentUrlMissing | AppError::Api(_) | AppError::Ai(_)) => {
                error!(error = %err, "upstream failure");
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": err.to_string() }))).into_response()
            }
            AppError::Internal(err) => {
                error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::Api(ApiError::SessionExpired), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::PaymentUrlMissing, StatusCode::BAD_GATEWAY),
            (
                AppError::Api(ApiError::Status { status: 404, message: "Not found.".into() }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Api(ApiError::Status { status: 500, message: "boom".into() }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Validation(ValidationErrors(vec![FieldError {
                    field: "phone".into(),
                    message: "required".into(),
                }])),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Internal(anyhow::anyhow!("db down")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
