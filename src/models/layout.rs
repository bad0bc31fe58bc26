use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Banner,
    Faq,
    Categories,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Banner => "banner",
            LayoutKind::Faq => "faq",
            LayoutKind::Categories => "categories",
        }
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "banner" => Ok(LayoutKind::Banner),
            "faq" => Ok(LayoutKind::Faq),
            "categories" => Ok(LayoutKind::Categories),
            _ => Err(format!("Invalid layout kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub image: ImageRef,
    pub title: String,
    pub sub_title: String,
}

/// One document per layout kind; the kind field is uniquely indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "_id")]
    pub id: String,
    pub kind: LayoutKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    #[serde(default)]
    pub faq: Vec<FaqItem>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Layout {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            banner: None,
            faq: Vec::new(),
            categories: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}
