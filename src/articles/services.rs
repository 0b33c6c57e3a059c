use serde_json::Value;
use tracing::{info, warn};

use super::actions::{available_actions, AvailableActions, EditorAction};
use crate::auth::repo_types::Session;
use crate::backend::{dto::ArticleSummary, endpoints, MultipartBody};
use crate::error::AppError;
use crate::payment::handoff::{self, PaymentRedirect};
use crate::state::AppState;
use crate::validation::Validator;

pub const ARTICLE_FILE: &str = "file";
pub const FINAL_VERSION_FILE: &str = "finalVersionFile";

const SUBMISSION_FIELDS: [&str; 4] = ["title", "abstract", "keywords", "journal"];

pub async fn submit(
    state: &AppState,
    session: &mut Session,
    incoming: MultipartBody,
) -> Result<PaymentRedirect, AppError> {
    let text = |name: &str| incoming.field(name).unwrap_or_default().to_string();
    Validator::new()
        .required("title", &text("title"))
        .required("abstract", &text("abstract"))
        .required("journal", &text("journal"))
        .file(ARTICLE_FILE, incoming.has_file(ARTICLE_FILE))
        .finish()?;

    let mut body = MultipartBody::new();
    for name in SUBMISSION_FIELDS {
        if let Some(value) = incoming.field(name) {
            body = body.text(name, value.trim());
        }
    }
    if let Some(file) = incoming.file_part(ARTICLE_FILE) {
        body = body.file(file.clone());
    }

    let response = state.call(session, &endpoints::submit_article(body)).await?;
    info!(session_id = %session.id, "article submitted");
    handoff::from_response(response)
}

/// Revisions may carry a fee; without a `payment_url` the updated article is returned as is.
pub async fn submit_revision(
    state: &AppState,
    session: &mut Session,
    id: &str,
    incoming: MultipartBody,
) -> Result<Value, AppError> {
    let file = incoming.file_part(ARTICLE_FILE).cloned();
    Validator::new().file(ARTICLE_FILE, file.is_some()).finish()?;

    let mut body = MultipartBody::new();
    if let Some(file) = file {
        body = body.file(file);
    }
    let response = state
        .call(session, &endpoints::submit_revision(id, body))
        .await?;
    info!(article_id = %id, "revision submitted");

    let needs_payment = response
        .as_ref()
        .and_then(|b| b.get("payment_url"))
        .is_some_and(|url| !url.is_null());
    if needs_payment {
        let redirect = handoff::from_response(response)?;
        return serde_json::to_value(redirect).map_err(|e| AppError::Internal(e.into()));
    }
    Ok(response.unwrap_or(Value::Null))
}

pub async fn actions_for(
    state: &AppState,
    session: &mut Session,
    id: &str,
    final_file_attached: bool,
) -> Result<AvailableActions, AppError> {
    let article: ArticleSummary = state.call_as(session, &endpoints::article(id)).await?;
    Ok(available_actions(article.status, final_file_attached))
}

/// An editor decision on an assigned article.
#[derive(Debug)]
pub enum Decision {
    RequestRevision { notes: String },
    Reject { notes: String },
    Accept { final_version: MultipartBody },
}

impl Decision {
    pub fn action(&self) -> EditorAction {
        match self {
            Decision::RequestRevision { .. } => EditorAction::RequestRevision,
            Decision::Reject { .. } => EditorAction::Reject,
            Decision::Accept { .. } => EditorAction::Accept,
        }
    }
}

/// Run an editor decision after checking it is still allowed for the article's status.
pub async fn review(
    state: &AppState,
    session: &mut Session,
    id: &str,
    decision: Decision,
) -> Result<Value, AppError> {
    let mut check = Validator::new();
    let final_file_attached = match &decision {
        Decision::RequestRevision { notes } => {
            check.required("notes", notes);
            false
        }
        Decision::Reject { .. } => false,
        Decision::Accept { final_version } => {
            let attached = final_version.has_file(FINAL_VERSION_FILE);
            check.file(FINAL_VERSION_FILE, attached);
            attached
        }
    };
    check.finish()?;

    let action = decision.action();
    let allowed = actions_for(state, session, id, final_file_attached).await?;
    if !allowed.allows(action) {
        warn!(article_id = %id, ?action, "editor action not allowed for article status");
        return Err(AppError::Conflict(
            "This action is no longer available for the article.".into(),
        ));
    }

    let req = match decision {
        Decision::RequestRevision { notes } => endpoints::request_revision(id, notes.trim()),
        Decision::Reject { notes } => endpoints::reject_article(id, notes.trim()),
        Decision::Accept { final_version } => {
            let mut body = MultipartBody::new();
            if let Some(file) = final_version.file_part(FINAL_VERSION_FILE) {
                body = body.file(file.clone());
            }
            endpoints::accept_article(id, body)
        }
    };
    let response = state.call(session, &req).await?;
    info!(article_id = %id, ?action, "editor decision recorded");
    Ok(response.unwrap_or(Value::Null))
}
