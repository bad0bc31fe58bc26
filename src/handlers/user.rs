//! Profile and user-administration endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::doc;

use crate::dtos::user::{
    UpdateAvatarRequest, UpdatePasswordRequest, UpdateUserInfoRequest, UpdateUserRoleRequest,
    UserListResponse, UserResponse,
};
use crate::dtos::MessageResponse;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{CourseRef, Role};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString, ValidatedJson};
use crate::AppState;

pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user,
    })
}

pub async fn update_user_info(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateUserInfoRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    state
        .db
        .users()
        .update_one(
            doc! { "_id": &user.id },
            doc! { "$set": { "name": &req.name, "updated_at": mongodb::bson::DateTime::now() } },
            None,
        )
        .await?;

    let updated = state
        .db
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let sanitized = updated.sanitized();
    state.sessions.put_snapshot(&sanitized).await?;

    Ok(Json(UserResponse {
        success: true,
        user: sanitized,
    }))
}

pub async fn update_user_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let stored = state
        .db
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    // Social accounts have no local password to change.
    let current_hash = stored
        .password_hash
        .ok_or_else(|| ApiError::Validation("Password change unavailable for this account".into()))?;

    verify_password(
        &Password::new(req.old_password),
        &PasswordHashString::new(current_hash),
    )
    .map_err(|_| ApiError::InvalidCredential)?;

    let new_hash = hash_password(&Password::new(req.new_password))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

    state
        .db
        .users()
        .update_one(
            doc! { "_id": &user.id },
            doc! { "$set": {
                "password_hash": new_hash.into_string(),
                "updated_at": mongodb::bson::DateTime::now(),
            } },
            None,
        )
        .await?;

    tracing::info!(user_id = %user.id, "Password updated");

    Ok(Json(MessageResponse::ok("Password updated successfully")))
}

pub async fn update_user_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateAvatarRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let stored = state
        .db
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if let Some(old) = &stored.avatar {
        if !old.public_id.is_empty() {
            state.uploads.delete_image(&old.public_id).await?;
        }
    }

    let image = state.uploads.upload_image(&req.avatar, "avatars").await?;

    state
        .db
        .users()
        .update_one(
            doc! { "_id": &user.id },
            doc! { "$set": {
                "avatar": mongodb::bson::to_bson(&image)
                    .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?,
                "updated_at": mongodb::bson::DateTime::now(),
            } },
            None,
        )
        .await?;

    let updated = state
        .db
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let sanitized = updated.sanitized();
    state.sessions.put_snapshot(&sanitized).await?;

    Ok(Json(UserResponse {
        success: true,
        user: sanitized,
    }))
}

/// Grant course access without an order document.
pub async fn enroll(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(String, String)>,
) -> Result<Json<UserResponse>, ApiError> {
    let target = state
        .db
        .find_user_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    state
        .db
        .find_course_by_id(&course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    if target.is_enrolled(&course_id) {
        return Err(ApiError::Conflict("User is already enrolled".into()));
    }

    let course_ref = CourseRef {
        course_id: course_id.clone(),
    };
    state
        .db
        .users()
        .update_one(
            doc! { "_id": &user_id },
            doc! {
                "$push": { "courses": mongodb::bson::to_bson(&course_ref)
                    .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))? },
                "$set": { "updated_at": mongodb::bson::DateTime::now() },
            },
            None,
        )
        .await?;

    let updated = state
        .db
        .find_user_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let sanitized = updated.sanitized();
    state.sessions.update_snapshot_if_present(&sanitized).await?;

    tracing::info!(user_id = %user_id, course_id = %course_id, "User enrolled");

    Ok(Json(UserResponse {
        success: true,
        user: sanitized,
    }))
}

pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(UserListResponse {
        success: true,
        users: users.iter().map(|u| u.sanitized()).collect(),
    }))
}

pub async fn update_user_role(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateUserRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role: Role = req
        .role
        .parse()
        .map_err(|e: String| ApiError::Validation(e))?;

    let target = state
        .db
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    state
        .db
        .users()
        .update_one(
            doc! { "_id": &target.id },
            doc! { "$set": {
                "role": role.as_str(),
                "updated_at": mongodb::bson::DateTime::now(),
            } },
            None,
        )
        .await?;

    let mut sanitized = target.sanitized();
    sanitized.role = role;
    state.sessions.update_snapshot_if_present(&sanitized).await?;

    tracing::info!(user_id = %target.id, role = %role, "User role updated");

    Ok(Json(UserResponse {
        success: true,
        user: sanitized,
    }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let result = state
        .db
        .users()
        .delete_one(doc! { "_id": &user_id }, None)
        .await?;

    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("User not found".into()));
    }

    // Revoke outstanding sessions alongside the document.
    state.sessions.revoke(&user_id).await?;

    tracing::info!(user_id = %user_id, "User deleted");

    Ok(Json(MessageResponse::ok("User deleted successfully")))
}
