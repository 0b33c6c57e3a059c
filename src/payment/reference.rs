//! Structured form of the gateway's `merchant_trans_id`.

use crate::guard::routes::DASHBOARD_PATH;

const MY_ARTICLES_PATH: &str = "/my-articles";
const SERVICES_PATH: &str = "/services";
const PLAGIARISM_PATH: &str = "/plagiarism-check";
const AI_DOCUMENT_PATH: &str = "/ai-document-utilities";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReference {
    /// `article_<id>[_<timestamp>]`; the id may be empty.
    Article { id: String, timestamp: Option<String> },
    /// `service_<...>`: `service_<slug>_<id>` or the backend's `service_<order id>_<timestamp>`.
    Service { segments: Vec<String> },
    Unknown(String),
}

impl PaymentReference {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("article_") {
            let mut parts = rest.split('_');
            let id = parts.next().unwrap_or_default().to_string();
            let timestamp = parts.next().filter(|t| !t.is_empty()).map(str::to_string);
            return Self::Article { id, timestamp };
        }
        if let Some(rest) = raw.strip_prefix("service_") {
            let segments = rest
                .split('_')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            return Self::Service { segments };
        }
        Self::Unknown(raw.to_string())
    }

    /// Page the user returns to after the gateway.
    pub fn redirect_target(&self) -> &'static str {
        match self {
            Self::Article { .. } => MY_ARTICLES_PATH,
            Self::Service { segments } => {
                let mentions = |needle: &str| segments.iter().any(|s| s.contains(needle));
                if mentions("plagiarism") {
                    PLAGIARISM_PATH
                } else if mentions("ai-document") {
                    AI_DOCUMENT_PATH
                } else {
                    SERVICES_PATH
                }
            }
            Self::Unknown(_) => DASHBOARD_PATH,
        }
    }
}

/// Missing or blank references land on the dashboard.
pub fn redirect_for(merchant_trans_id: Option<&str>) -> &'static str {
    merchant_trans_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| PaymentReference::parse(id).redirect_target())
        .unwrap_or(DASHBOARD_PATH)
}
