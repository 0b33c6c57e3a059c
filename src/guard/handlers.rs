use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{navigate, routes, AnyUser, AuthState, Navigation};
use crate::auth::extractors::{Authorized, OptionalSession};
use crate::auth::services::resolve_auth_state;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NavigationRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct MenuEntry {
    pub page: routes::Page,
    pub path: &'static str,
    pub label: &'static str,
}

#[instrument(skip(state, session, req), fields(path = %req.path))]
pub async fn resolve_navigation(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    Json(req): Json<NavigationRequest>,
) -> Json<Navigation> {
    let auth = match session {
        Some(session) => resolve_auth_state(&state, session).await.0,
        None => AuthState::Anonymous,
    };
    let nav = navigate(&auth, &req.path);
    debug!(page = ?nav.page, decision = ?nav.decision, "navigation resolved");
    Json(nav)
}

#[instrument(skip(auth))]
pub async fn menu(auth: Authorized<AnyUser>) -> Json<Vec<MenuEntry>> {
    let entries = routes::menu_for(auth.user.role)
        .filter_map(|spec| {
            spec.menu_label.map(|label| MenuEntry {
                page: spec.page,
                path: spec.pattern,
                label,
            })
        })
        .collect();
    Json(entries)
}
