//! Service orders: per-service forms, local validation, hand-off to payment.

use crate::state::AppState;
use axum::Router;

pub mod forms;
pub mod handlers;
pub mod pricing;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
