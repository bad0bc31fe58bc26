use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub course_id: String,
    pub user_id: String,
    /// Opaque provider payload; no payment integration lives here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<serde_json::Value>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(course_id: String, user_id: String, payment_info: Option<serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            course_id,
            user_id,
            payment_info,
            created_at: Utc::now(),
        }
    }
}
