//! Per-user portal state: notifications, calendar tasks and completed payments.

use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

#[cfg(test)]
pub use repo::MemoryStateStore;
pub use repo::{PgStateStore, StateStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::notification_routes())
        .merge(handlers::task_routes())
        .merge(handlers::payment_routes())
}
