use std::ops::Deref;

use serde::Deserialize;

/// Article id taken from the portal path; it is spliced into backend URLs, so only
/// `[A-Za-z0-9_-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ArticleId(String);

impl TryFrom<String> for ArticleId {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, String> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(ArticleId(raw))
        } else {
            Err(format!("invalid article id: {raw:?}"))
        }
    }
}

impl Deref for ArticleId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewNotes {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionsQuery {
    #[serde(default)]
    pub final_file_attached: bool,
}
