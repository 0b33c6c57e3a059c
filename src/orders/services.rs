use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::forms::{ServiceForm, ATTACHED_FILE};
use crate::auth::repo_types::Session;
use crate::backend::{dto::id_as_string, endpoints, MultipartBody};
use crate::error::AppError;
use crate::payment::handoff::{self, PaymentRedirect};
use crate::state::AppState;

pub const SERVICE_ID: &str = "service_id";
pub const FORM_DATA: &str = "form_data_str";

#[derive(Debug, Deserialize)]
struct ServiceRef {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
}

/// Validate locally, forward to `/service-orders/`, return the gateway hand-off.
pub async fn place_order(
    state: &AppState,
    session: &mut Session,
    slug: &str,
    incoming: MultipartBody,
) -> Result<PaymentRedirect, AppError> {
    let raw = incoming.field(FORM_DATA).unwrap_or("{}");
    let data: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("Malformed form data: {e}")))?;
    let form = ServiceForm::parse(slug, data).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let attachment = incoming.file_part(ATTACHED_FILE);
    form.validate(attachment.is_some())?;

    let service_id = match incoming.field(SERVICE_ID).map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            let service: ServiceRef = state.call_as(session, &endpoints::service(slug)).await?;
            debug!(%slug, service_id = %service.id, "service id resolved");
            service.id
        }
    };

    let form_data =
        serde_json::to_string(&form).map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
    let mut body = MultipartBody::new()
        .text(SERVICE_ID, service_id.clone())
        .text(FORM_DATA, form_data);
    if let Some(file) = attachment {
        body = body.file(file.clone());
    }

    let response = state
        .call(session, &endpoints::create_service_order(body))
        .await?;
    info!(%slug, %service_id, "service order created");
    handoff::from_response(response)
}
