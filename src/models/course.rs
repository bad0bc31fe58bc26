//! Course documents with embedded content sections, Q&A threads and reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{ImageRef, SanitizedUser};

/// Named bullet item used for benefits and prerequisites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleItem {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionLink {
    pub title: String,
    pub url: String,
}

/// Reply inside a question thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionReply {
    pub id: String,
    pub user: SanitizedUser,
    pub answer: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub user: SanitizedUser,
    pub question: String,
    #[serde(default)]
    pub replies: Vec<QuestionReply>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn new(user: SanitizedUser, question: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user,
            question,
            replies: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReply {
    pub id: String,
    pub user: SanitizedUser,
    pub comment: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user: SanitizedUser,
    pub rating: f64,
    pub comment: String,
    #[serde(default)]
    pub replies: Vec<ReviewReply>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user: SanitizedUser, rating: f64, comment: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user,
            rating,
            comment,
            replies: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// One unit of course content. Video url, links and the question thread are
/// stripped from unauthenticated catalog responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSection {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_length_minutes: i64,
    #[serde(default)]
    pub links: Vec<SectionLink>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,
    pub tags: String,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub benefits: Vec<TitleItem>,
    #[serde(default)]
    pub prerequisites: Vec<TitleItem>,
    #[serde(default)]
    pub sections: Vec<CourseSection>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Average of review ratings; recomputed whenever a review is added.
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub purchased: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn section_mut(&mut self, section_id: &str) -> Option<&mut CourseSection> {
        self.sections.iter_mut().find(|s| s.id == section_id)
    }

    pub fn review_mut(&mut self, review_id: &str) -> Option<&mut Review> {
        self.reviews.iter_mut().find(|r| r.id == review_id)
    }

    /// Recompute the rating average from the embedded reviews. Concurrent
    /// submissions can still lose an update (read-modify-write on the owning
    /// document); the document store's per-document atomicity bounds the skew.
    pub fn recompute_ratings(&mut self) {
        if self.reviews.is_empty() {
            self.ratings = 0.0;
            return;
        }
        let sum: f64 = self.reviews.iter().map(|r| r.rating).sum();
        self.ratings = sum / self.reviews.len() as f64;
    }

    /// Catalog projection: everything a non-purchaser may see.
    pub fn without_restricted_content(&self) -> Course {
        let mut course = self.clone();
        for section in &mut course.sections {
            section.video_url = String::new();
            section.links.clear();
            section.questions.clear();
        }
        course
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn reviewer(name: &str) -> SanitizedUser {
        SanitizedUser {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: format!("{}@example.com", name),
            role: Role::Member,
            avatar: None,
            courses: Vec::new(),
        }
    }

    fn course() -> Course {
        let now = Utc::now();
        Course {
            id: Uuid::new_v4().to_string(),
            name: "Rust for Backend".into(),
            description: "d".into(),
            price: 49.0,
            estimated_price: None,
            thumbnail: None,
            tags: "rust".into(),
            level: "beginner".into(),
            demo_url: None,
            benefits: Vec::new(),
            prerequisites: Vec::new(),
            sections: vec![CourseSection {
                id: "s1".into(),
                title: "Intro".into(),
                description: "d".into(),
                video_url: "https://cdn/video.mp4".into(),
                video_length_minutes: 12,
                links: vec![SectionLink {
                    title: "slides".into(),
                    url: "https://cdn/slides".into(),
                }],
                questions: vec![Question::new(reviewer("ada"), "why?".into())],
            }],
            reviews: Vec::new(),
            ratings: 0.0,
            purchased: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ratings_average_over_reviews() {
        let mut c = course();
        c.reviews.push(Review::new(reviewer("a"), 5.0, "great".into()));
        c.reviews.push(Review::new(reviewer("b"), 2.0, "meh".into()));
        c.recompute_ratings();
        assert!((c.ratings - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ratings_zero_when_no_reviews() {
        let mut c = course();
        c.recompute_ratings();
        assert_eq!(c.ratings, 0.0);
    }

    #[test]
    fn catalog_projection_strips_restricted_fields() {
        let stripped = course().without_restricted_content();
        let section = &stripped.sections[0];
        assert!(section.video_url.is_empty());
        assert!(section.links.is_empty());
        assert!(section.questions.is_empty());
        // Public metadata survives.
        assert_eq!(section.title, "Intro");
    }
}
