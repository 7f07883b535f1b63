//! Creation model for generated outfit images

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::UserId;

/// One generation made by a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreationRecord {
    pub id: i32,
    pub user_id: UserId,
    pub media_url: Option<String>,
    pub prompt: Option<String>,
    pub recommendation_text: Option<String>,
    pub style: Option<String>,
    pub colors: Option<String>,
    pub height: Option<i32>,
    pub body_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
