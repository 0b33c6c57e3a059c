//! Author submissions and editor decisions on articles.

use crate::state::AppState;
use axum::Router;

pub mod actions;
pub mod dto;
pub mod handlers;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
