use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::backend::dto::User;

/// Portal session record. Holds the backend tokens so they never reach the browser.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,                          // portal session ID, subject of portal JWTs
    #[serde(skip_serializing)]
    pub access_token: String,              // backend bearer token
    #[serde(skip_serializing)]
    pub refresh_token: String,             // backend refresh token
    pub user_data: Option<Json<User>>,     // cached profile, None until resolved
    pub created_at: OffsetDateTime,
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        self.user_data.as_ref().map(|u| &u.0)
    }
}
