//! Read-only backend views behind role gates: dashboards, staff and admin listings.

pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
