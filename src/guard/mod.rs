//! Route gating. Access is a pure function of the session state, the user's role and
//! the route's declared roles; the same decision backs page navigation and API extractors.

pub mod handlers;
pub mod routes;

use std::collections::BTreeMap;

use axum::{routing::{get, post}, Router};
use serde::Serialize;

use crate::backend::dto::{Role, User};
use crate::state::AppState;
use routes::{Access, Page, DASHBOARD_PATH, LOGIN_PATH};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/navigation/resolve", post(handlers::resolve_navigation))
        .route("/navigation/menu", get(handlers::menu))
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// A session exists but the profile behind it has not been confirmed yet.
    Loading,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Render,
    Redirect { target: &'static str },
    Loading,
}

pub fn decide(auth: &AuthState, access: Access) -> Decision {
    match (access, auth) {
        (Access::Public, _) => Decision::Render,
        (_, AuthState::Loading) => Decision::Loading,
        (_, AuthState::Anonymous) => Decision::Redirect { target: LOGIN_PATH },
        (Access::Authenticated, AuthState::Authenticated(_)) => Decision::Render,
        (Access::Roles(roles), AuthState::Authenticated(user)) if roles.contains(&user.role) => {
            Decision::Render
        }
        (Access::Roles(_), AuthState::Authenticated(_)) => Decision::Redirect {
            target: DASHBOARD_PATH,
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    pub page: Page,
    pub params: BTreeMap<String, String>,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Full navigation answer for a client path; the shell root forwards to the dashboard.
pub fn navigate(auth: &AuthState, path: &str) -> Navigation {
    let matched = routes::resolve(path);
    let decision = match decide(auth, matched.spec.access) {
        Decision::Render if matched.spec.page == Page::Root => Decision::Redirect {
            target: DASHBOARD_PATH,
        },
        other => other,
    };
    Navigation {
        page: matched.spec.page,
        params: matched.params,
        decision,
    }
}

/// Role sets usable as type parameters of the `Authorized` extractor.
pub trait AllowedRoles: Send + Sync + 'static {
    const ACCESS: Access;
}

macro_rules! role_set {
    ($($name:ident => $access:expr),* $(,)?) => {
        $(
            pub struct $name;
            impl AllowedRoles for $name {
                const ACCESS: Access = $access;
            }
        )*
    };
}

role_set! {
    AnyUser => Access::Authenticated,
    Authors => Access::Roles(routes::AUTHORS),
    Editors => Access::Roles(routes::EDITORS),
    Admins => Access::Roles(routes::ADMINS),
    Finance => Access::Roles(routes::FINANCE),
    JournalStaff => Access::Roles(routes::JOURNAL_STAFF),
    ArticleReaders => Access::Roles(&[Role::Client, Role::JournalManager, Role::Admin]),
}
