use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Course;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SectionLinkPayload {
    #[validate(length(min = 1, message = "Link title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Link url is required"))]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CourseSectionPayload {
    #[validate(length(min = 1, message = "Section title is required"))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, message = "Video url is required"))]
    pub video_url: String,
    #[validate(range(min = 0, message = "Video length must not be negative"))]
    pub video_length_minutes: i64,
    #[serde(default)]
    pub links: Vec<SectionLinkPayload>,
}

/// Body for both course creation and edit. Sections replace the stored set
/// wholesale; question threads and reviews are preserved server-side.
#[derive(Debug, Deserialize, Validate)]
pub struct CoursePayload {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    pub estimated_price: Option<f64>,
    /// Data URL or remote URL handed to the upload collaborator.
    pub thumbnail: Option<String>,
    pub tags: String,
    pub level: String,
    pub demo_url: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub sections: Vec<CourseSectionPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, message = "Course id is required"))]
    pub course_id: String,
    #[validate(length(min = 1, message = "Section id is required"))]
    pub section_id: String,
    #[validate(length(min = 1, message = "Question text is required"))]
    pub question: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddAnswerRequest {
    #[validate(length(min = 1, message = "Course id is required"))]
    pub course_id: String,
    #[validate(length(min = 1, message = "Section id is required"))]
    pub section_id: String,
    #[validate(length(min = 1, message = "Question id is required"))]
    pub question_id: String,
    #[validate(length(min = 1, message = "Answer text is required"))]
    pub answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddReviewRequest {
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: f64,
    #[validate(length(min = 1, message = "Review text is required"))]
    pub review: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddReviewReplyRequest {
    #[validate(length(min = 1, message = "Course id is required"))]
    pub course_id: String,
    #[validate(length(min = 1, message = "Review id is required"))]
    pub review_id: String,
    #[validate(length(min = 1, message = "Reply text is required"))]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub success: bool,
    pub course: Course,
}

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub success: bool,
    pub courses: Vec<Course>,
}
