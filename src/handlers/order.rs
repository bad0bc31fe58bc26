//! Order placement and listing.

use axum::{extract::State, Json};
use mongodb::bson::doc;

use crate::dtos::order::{CreateOrderRequest, OrderListResponse, OrderResponse};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{CourseRef, Notification, Order};
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let course = state
        .db
        .find_course_by_id(&req.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    // Re-read the user; the snapshot's enrollment list may be stale.
    let buyer = state
        .db
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if buyer.is_enrolled(&course.id) {
        return Err(ApiError::Conflict(
            "You have already purchased this course".into(),
        ));
    }

    let order = Order::new(course.id.clone(), buyer.id.clone(), req.payment_info);
    state.db.orders().insert_one(&order, None).await?;

    let course_ref = CourseRef {
        course_id: course.id.clone(),
    };
    state
        .db
        .users()
        .update_one(
            doc! { "_id": &buyer.id },
            doc! {
                "$push": { "courses": mongodb::bson::to_bson(&course_ref)
                    .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))? },
                "$set": { "updated_at": mongodb::bson::DateTime::now() },
            },
            None,
        )
        .await?;

    // Atomic increment; no read-modify-write on the counter.
    state
        .db
        .courses()
        .update_one(
            doc! { "_id": &course.id },
            doc! { "$inc": { "purchased": 1 } },
            None,
        )
        .await?;

    let notification = Notification::new(
        buyer.id.clone(),
        "New Order".into(),
        format!("{} purchased {}", buyer.name, course.name),
    );
    state.db.notifications().insert_one(&notification, None).await?;

    state
        .email
        .send_order_confirmation(&buyer.email, &buyer.name, &course.name, course.price)
        .await?;

    // Keep the session snapshot's enrollment list current.
    let updated = state
        .db
        .find_user_by_id(&buyer.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    state.sessions.put_snapshot(&updated.sanitized()).await?;

    tracing::info!(user_id = %buyer.id, course_id = %course.id, "Order created");

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

pub async fn get_all_orders(
    State(state): State<AppState>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = state.db.list_orders().await?;
    Ok(Json(OrderListResponse {
        success: true,
        orders,
    }))
}
