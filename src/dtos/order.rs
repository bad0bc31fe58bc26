use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Order;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Course id is required"))]
    pub course_id: String,
    /// Carried through opaquely; no payment provider is called.
    pub payment_info: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}
