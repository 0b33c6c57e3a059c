use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Portal roles. A user carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Article author.
    Client,
    /// Editor of one or more journals.
    JournalManager,
    Admin,
    Accountant,
    Writer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Uz,
    Ru,
    En,
}

/// User profile as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub orcid_id: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Pending,
    Reviewing,
    NeedsRevision,
    Accepted,
    Rejected,
    Published,
}

impl ArticleStatus {
    /// Editorial decisions are final once an article leaves the review loop.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Published)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    PaymentPending,
    PaymentCompleted,
    PaymentFailed,
}

/// The slice of an article the portal reasons about; everything else passes through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub status: ArticleStatus,
    #[serde(default, alias = "submissionPaymentStatus")]
    pub submission_payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Backend replies to submissions that require payment carry a gateway URL.
#[derive(Debug, Deserialize)]
pub struct PaymentHandOff {
    pub payment_url: Option<String>,
}

/// Pull a human message out of a backend error body.
pub fn error_message(body: &Value) -> Option<String> {
    ["error", "detail"].iter().find_map(|key| match body.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// Backend ids arrive as numbers or strings depending on the endpoint.
pub fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
