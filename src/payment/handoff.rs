use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::backend::{client::decode, dto::PaymentHandOff};
use crate::error::AppError;

/// Instruction for the browser to continue at the payment gateway.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRedirect {
    pub redirect: String,
}

pub fn from_response(body: Option<Value>) -> Result<PaymentRedirect, AppError> {
    let hand_off: PaymentHandOff = decode(body).unwrap_or(PaymentHandOff { payment_url: None });
    match hand_off.payment_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            info!(payment_url = %url, "handing off to payment gateway");
            Ok(PaymentRedirect { redirect: url })
        }
        None => {
            warn!("backend response carried no payment_url");
            Err(AppError::PaymentUrlMissing)
        }
    }
}
