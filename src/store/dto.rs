use serde::Deserialize;
use time::Date;

use super::repo_types::NotificationKind;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    #[serde(default, rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub description: String,
    #[serde(with = "iso_date")]
    pub due_date: Date,
    #[serde(default)]
    pub article_id: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub due_date: Option<Date>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}
