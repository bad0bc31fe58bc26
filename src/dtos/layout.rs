use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Category, FaqItem, Layout};

#[derive(Debug, Clone, Deserialize)]
pub struct BannerPayload {
    /// Data URL or remote URL handed to the upload collaborator.
    pub image: String,
    pub title: String,
    pub sub_title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LayoutPayload {
    #[validate(length(min = 1, message = "Layout kind is required"))]
    #[serde(rename = "type")]
    pub kind: String,
    pub banner: Option<BannerPayload>,
    #[serde(default)]
    pub faq: Vec<FaqItem>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub success: bool,
    pub layout: Layout,
}
