pub mod auth;
pub mod course;
pub mod layout;
pub mod notification;
pub mod order;
pub mod user;

use serde::Serialize;

/// Minimal `{success, message}` envelope for operations with no payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
