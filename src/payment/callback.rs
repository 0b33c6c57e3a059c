use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::reference::redirect_for;
use crate::store::StateStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentCallback {
    pub error_code: Option<String>,
    pub merchant_trans_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    Cancelled,
    Error,
}

impl PaymentOutcome {
    pub fn classify(error_code: Option<&str>) -> Self {
        match error_code.map(str::trim) {
            Some("0") => Self::Success,
            Some("-1") | Some("-9") => Self::Cancelled,
            _ => Self::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusView {
    pub status: PaymentOutcome,
    pub message: String,
    pub redirect: &'static str,
    /// True only when this visit added the reference to the user's completed payments.
    pub recorded: bool,
}

pub fn message_for(outcome: PaymentOutcome, error_code: Option<&str>) -> String {
    match outcome {
        PaymentOutcome::Success => {
            "Payment completed successfully! Your order is being processed.".to_string()
        }
        PaymentOutcome::Cancelled => "Payment was cancelled.".to_string(),
        PaymentOutcome::Error => {
            let code = error_code.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("unknown");
            format!("An error occurred during payment. Error code: {code}.")
        }
    }
}

/// Interpret a gateway return. Completed payments are recorded for `user_id` when known.
pub async fn interpret(
    store: &dyn StateStore,
    user_id: Option<&str>,
    callback: &PaymentCallback,
) -> anyhow::Result<PaymentStatusView> {
    let code = callback.error_code.as_deref();
    let reference = callback
        .merchant_trans_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let status = PaymentOutcome::classify(code);

    let mut recorded = false;
    match (status, reference, user_id) {
        (PaymentOutcome::Success, Some(reference), Some(user_id)) => {
            recorded = store.record_completed_payment(user_id, reference).await?;
            info!(%user_id, merchant_trans_id = %reference, recorded, "payment completed");
        }
        (PaymentOutcome::Success, Some(reference), None) => {
            info!(merchant_trans_id = %reference, "payment completed for anonymous visitor");
        }
        (PaymentOutcome::Cancelled, _, _) => {
            info!(error_code = ?code, merchant_trans_id = ?reference, "payment cancelled");
        }
        (PaymentOutcome::Error, _, _) => {
            warn!(error_code = ?code, merchant_trans_id = ?reference, "payment failed");
        }
        _ => {}
    }

    Ok(PaymentStatusView {
        status,
        message: message_for(status, code),
        redirect: redirect_for(reference),
        recorded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStateStore;

    fn callback(code: Option<&str>, reference: Option<&str>) -> PaymentCallback {
        PaymentCallback {
            error_code: code.map(str::to_string),
            merchant_trans_id: reference.map(str::to_string),
        }
    }

    #[test]
    fn classification() {
        assert_eq!(PaymentOutcome::classify(Some("0")), PaymentOutcome::Success);
        assert_eq!(PaymentOutcome::classify(Some("-1")), PaymentOutcome::Cancelled);
        assert_eq!(PaymentOutcome::classify(Some("-9")), PaymentOutcome::Cancelled);
        assert_eq!(PaymentOutcome::classify(Some("-5017")), PaymentOutcome::Error);
        assert_eq!(PaymentOutcome::classify(None), PaymentOutcome::Error);
    }

    #[test]
    fn error_message_embeds_code() {
        assert!(message_for(PaymentOutcome::Error, Some("-5017")).contains("-5017"));
        assert!(message_for(PaymentOutcome::Error, None).contains("unknown"));
    }

    #[tokio::test]
    async fn success_records_exactly_once() {
        let store = MemoryStateStore::default();
        let cb = callback(Some("0"), Some("article_12_1718000000"));

        let first = interpret(&store, Some("7"), &cb).await.unwrap();
        assert_eq!(first.status, PaymentOutcome::Success);
        assert_eq!(first.redirect, "/my-articles");
        assert!(first.recorded);

        let again = interpret(&store, Some("7"), &cb).await.unwrap();
        assert!(!again.recorded);
        assert_eq!(store.completed_payments("7").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_and_failed_record_nothing() {
        let store = MemoryStateStore::default();
        let view = interpret(&store, Some("7"), &callback(Some("-9"), Some("service_plagiarism_3")))
            .await
            .unwrap();
        assert_eq!(view.status, PaymentOutcome::Cancelled);
        assert_eq!(view.redirect, "/plagiarism-check");

        let view = interpret(&store, Some("7"), &callback(Some("-4"), None)).await.unwrap();
        assert_eq!(view.status, PaymentOutcome::Error);
        assert_eq!(view.redirect, "/dashboard");
        assert!(store.completed_payments("7").await.unwrap().is_empty());
    }
}
