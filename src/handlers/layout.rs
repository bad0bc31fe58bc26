//! Home page layout configuration (banner, FAQ, categories).

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use mongodb::bson::doc;

use crate::dtos::layout::{LayoutPayload, LayoutResponse};
use crate::error::ApiError;
use crate::models::{Banner, Layout, LayoutKind};
use crate::utils::ValidatedJson;
use crate::AppState;

async fn banner_from_payload(
    state: &AppState,
    payload: crate::dtos::layout::BannerPayload,
) -> Result<Banner, ApiError> {
    let image = state.uploads.upload_image(&payload.image, "layout").await?;
    Ok(Banner {
        image,
        title: payload.title,
        sub_title: payload.sub_title,
    })
}

pub async fn create_layout(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LayoutPayload>,
) -> Result<Json<LayoutResponse>, ApiError> {
    let kind: LayoutKind = req
        .kind
        .parse()
        .map_err(|e: String| ApiError::Validation(e))?;

    if state.db.find_layout_by_kind(kind.as_str()).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Layout {} already exists",
            kind.as_str()
        )));
    }

    let mut layout = Layout::new(kind);
    match kind {
        LayoutKind::Banner => {
            let payload = req
                .banner
                .ok_or_else(|| ApiError::Validation("Banner payload is required".into()))?;
            layout.banner = Some(banner_from_payload(&state, payload).await?);
        }
        LayoutKind::Faq => layout.faq = req.faq,
        LayoutKind::Categories => layout.categories = req.categories,
    }

    state.db.layouts().insert_one(&layout, None).await?;

    tracing::info!(kind = %kind.as_str(), "Layout created");

    Ok(Json(LayoutResponse {
        success: true,
        layout,
    }))
}

pub async fn update_layout(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LayoutPayload>,
) -> Result<Json<LayoutResponse>, ApiError> {
    let kind: LayoutKind = req
        .kind
        .parse()
        .map_err(|e: String| ApiError::Validation(e))?;

    let mut layout = state
        .db
        .find_layout_by_kind(kind.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("Layout not found".into()))?;

    match kind {
        LayoutKind::Banner => {
            let payload = req
                .banner
                .ok_or_else(|| ApiError::Validation("Banner payload is required".into()))?;
            if let Some(old) = &layout.banner {
                if !old.image.public_id.is_empty() {
                    state.uploads.delete_image(&old.image.public_id).await?;
                }
            }
            layout.banner = Some(banner_from_payload(&state, payload).await?);
        }
        LayoutKind::Faq => layout.faq = req.faq,
        LayoutKind::Categories => layout.categories = req.categories,
    }
    layout.updated_at = Utc::now();

    state
        .db
        .layouts()
        .replace_one(doc! { "_id": &layout.id }, &layout, None)
        .await?;

    tracing::info!(kind = %kind.as_str(), "Layout updated");

    Ok(Json(LayoutResponse {
        success: true,
        layout,
    }))
}

pub async fn get_layout(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<LayoutResponse>, ApiError> {
    let kind: LayoutKind = kind.parse().map_err(|e: String| ApiError::Validation(e))?;

    let layout = state
        .db
        .find_layout_by_kind(kind.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("Layout not found".into()))?;

    Ok(Json(LayoutResponse {
        success: true,
        layout,
    }))
}
