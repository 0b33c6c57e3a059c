//! Writing assistance backed by a generative text model.

pub mod client;
pub mod handlers;
pub mod services;

pub use client::{AiError, DisabledModel, GeminiClient, TextModel};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
