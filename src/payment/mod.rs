//! Payment gateway returns: outcome, message, where to send the user next.

use crate::state::AppState;
use axum::Router;

pub mod callback;
pub mod handoff;
pub mod handlers;
pub mod reference;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
