//! Admin notification feed.

use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::doc;

use crate::dtos::notification::NotificationListResponse;
use crate::error::ApiError;
use crate::models::NotificationStatus;
use crate::AppState;

pub async fn get_all_notifications(
    State(state): State<AppState>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let notifications = state.db.list_notifications().await?;
    Ok(Json(NotificationListResponse {
        success: true,
        notifications,
    }))
}

/// Mark one notification read; responds with the refreshed feed.
pub async fn update_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let result = state
        .db
        .notifications()
        .update_one(
            doc! { "_id": &notification_id },
            doc! { "$set": { "status": NotificationStatus::Read.to_string() } },
            None,
        )
        .await?;

    if result.matched_count == 0 {
        return Err(ApiError::NotFound("Notification not found".into()));
    }

    let notifications = state.db.list_notifications().await?;
    Ok(Json(NotificationListResponse {
        success: true,
        notifications,
    }))
}
