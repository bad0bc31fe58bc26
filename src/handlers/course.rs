//! Course catalog, content, Q&A and review endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use mongodb::bson::doc;
use uuid::Uuid;

use crate::config::COURSE_CACHE_TTL_SECONDS;
use crate::dtos::course::{
    AddAnswerRequest, AddQuestionRequest, AddReviewReplyRequest, AddReviewRequest,
    CourseListResponse, CoursePayload, CourseResponse,
};
use crate::dtos::MessageResponse;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{
    Course, CourseSection, Notification, Question, QuestionReply, Review, ReviewReply, Role,
    SanitizedUser, SectionLink, TitleItem,
};
use crate::services::course_key;
use crate::utils::ValidatedJson;
use crate::AppState;

fn sections_from_payload(payload: Vec<crate::dtos::course::CourseSectionPayload>) -> Vec<CourseSection> {
    payload
        .into_iter()
        .map(|s| CourseSection {
            id: Uuid::new_v4().to_string(),
            title: s.title,
            description: s.description,
            video_url: s.video_url,
            video_length_minutes: s.video_length_minutes,
            links: s
                .links
                .into_iter()
                .map(|l| SectionLink {
                    title: l.title,
                    url: l.url,
                })
                .collect(),
            questions: Vec::new(),
        })
        .collect()
}

fn title_items(titles: Vec<String>) -> Vec<TitleItem> {
    titles.into_iter().map(|title| TitleItem { title }).collect()
}

async fn save_course(state: &AppState, course: &Course) -> Result<(), ApiError> {
    state
        .db
        .courses()
        .replace_one(doc! { "_id": &course.id }, course, None)
        .await?;
    // Drop the cached detail so the next read rebuilds it.
    state
        .cache
        .delete_cache(&course_key(&course.id))
        .await
        .map_err(ApiError::Internal)?;
    Ok(())
}

fn can_access_content(user: &SanitizedUser, course_id: &str) -> bool {
    user.is_enrolled(course_id) || user.role == Role::Admin
}

pub async fn create_course(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CoursePayload>,
) -> Result<Json<CourseResponse>, ApiError> {
    let thumbnail = match &req.thumbnail {
        Some(payload) => Some(state.uploads.upload_image(payload, "courses").await?),
        None => None,
    };

    let now = Utc::now();
    let course = Course {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        description: req.description,
        price: req.price,
        estimated_price: req.estimated_price,
        thumbnail,
        tags: req.tags,
        level: req.level,
        demo_url: req.demo_url,
        benefits: title_items(req.benefits),
        prerequisites: title_items(req.prerequisites),
        sections: sections_from_payload(req.sections),
        reviews: Vec::new(),
        ratings: 0.0,
        purchased: 0,
        created_at: now,
        updated_at: now,
    };

    state.db.courses().insert_one(&course, None).await?;

    tracing::info!(course_id = %course.id, "Course created");

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

pub async fn edit_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CoursePayload>,
) -> Result<Json<CourseResponse>, ApiError> {
    let mut course = state
        .db
        .find_course_by_id(&course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    if let Some(payload) = &req.thumbnail {
        if let Some(old) = &course.thumbnail {
            if !old.public_id.is_empty() {
                state.uploads.delete_image(&old.public_id).await?;
            }
        }
        course.thumbnail = Some(state.uploads.upload_image(payload, "courses").await?);
    }

    course.name = req.name;
    course.description = req.description;
    course.price = req.price;
    course.estimated_price = req.estimated_price;
    course.tags = req.tags;
    course.level = req.level;
    course.demo_url = req.demo_url;
    course.benefits = title_items(req.benefits);
    course.prerequisites = title_items(req.prerequisites);
    // Sections are replaced wholesale; reviews and ratings survive the edit.
    course.sections = sections_from_payload(req.sections);
    course.updated_at = Utc::now();

    save_course(&state, &course).await?;

    tracing::info!(course_id = %course.id, "Course updated");

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

/// Public course detail, cached for 7 days and stripped of paid content.
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let key = course_key(&course_id);

    if let Some(cached) = state
        .cache
        .get_cache(&key)
        .await
        .map_err(ApiError::Internal)?
    {
        if let Ok(course) = serde_json::from_str::<Course>(&cached) {
            return Ok(Json(CourseResponse {
                success: true,
                course,
            }));
        }
        // Corrupt cache entry falls through to a rebuild.
    }

    let course = state
        .db
        .find_course_by_id(&course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?
        .without_restricted_content();

    let payload = serde_json::to_string(&course)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;
    state
        .cache
        .set_cache(&key, &payload, COURSE_CACHE_TTL_SECONDS)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

/// Public catalog listing, stripped of paid content.
pub async fn get_courses(
    State(state): State<AppState>,
) -> Result<Json<CourseListResponse>, ApiError> {
    let courses = state
        .db
        .list_courses()
        .await?
        .iter()
        .map(Course::without_restricted_content)
        .collect();

    Ok(Json(CourseListResponse {
        success: true,
        courses,
    }))
}

/// Full course content for enrolled users and admins.
pub async fn get_course_content(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    if !can_access_content(&user, &course_id) {
        return Err(ApiError::Forbidden(
            "You are not eligible to access this course".into(),
        ));
    }

    let course = state
        .db
        .find_course_by_id(&course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

pub async fn add_question(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<AddQuestionRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let mut course = state
        .db
        .find_course_by_id(&req.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    let course_name = course.name.clone();
    let section = course
        .section_mut(&req.section_id)
        .ok_or_else(|| ApiError::NotFound("Section not found".into()))?;
    let section_title = section.title.clone();

    section
        .questions
        .push(Question::new(user.clone(), req.question));
    course.updated_at = Utc::now();

    save_course(&state, &course).await?;

    let notification = Notification::new(
        user.id.clone(),
        "New Question Received".into(),
        format!(
            "{} asked a question in {} ({})",
            user.name, section_title, course_name
        ),
    );
    state.db.notifications().insert_one(&notification, None).await?;

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

pub async fn add_answer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<AddAnswerRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let mut course = state
        .db
        .find_course_by_id(&req.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    let course_name = course.name.clone();
    let section = course
        .section_mut(&req.section_id)
        .ok_or_else(|| ApiError::NotFound("Section not found".into()))?;
    let section_title = section.title.clone();

    let question = section
        .questions
        .iter_mut()
        .find(|q| q.id == req.question_id)
        .ok_or_else(|| ApiError::NotFound("Question not found".into()))?;

    let author = question.user.clone();
    question.replies.push(QuestionReply {
        id: Uuid::new_v4().to_string(),
        user: user.clone(),
        answer: req.answer,
        created_at: Utc::now(),
    });
    course.updated_at = Utc::now();

    save_course(&state, &course).await?;

    if author.id == user.id {
        // Self-answer: surface in the admin notification feed instead.
        let notification = Notification::new(
            user.id.clone(),
            "New Question Reply Received".into(),
            format!(
                "{} replied in {} ({})",
                user.name, section_title, course_name
            ),
        );
        state.db.notifications().insert_one(&notification, None).await?;
    } else {
        state
            .email
            .send_question_reply_notice(&author.email, &course_name, &section_title)
            .await?;
    }

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

pub async fn add_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(course_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AddReviewRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    if !can_access_content(&user, &course_id) {
        return Err(ApiError::Forbidden(
            "You are not eligible to review this course".into(),
        ));
    }

    let mut course = state
        .db
        .find_course_by_id(&course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    course
        .reviews
        .push(Review::new(user.clone(), req.rating, req.review));
    course.recompute_ratings();
    course.updated_at = Utc::now();

    save_course(&state, &course).await?;

    let notification = Notification::new(
        user.id.clone(),
        "New Review Received".into(),
        format!("{} reviewed {}", user.name, course.name),
    );
    state.db.notifications().insert_one(&notification, None).await?;

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

pub async fn add_reply_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<AddReviewReplyRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let mut course = state
        .db
        .find_course_by_id(&req.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    let review = course
        .review_mut(&req.review_id)
        .ok_or_else(|| ApiError::NotFound("Review not found".into()))?;

    review.replies.push(ReviewReply {
        id: Uuid::new_v4().to_string(),
        user,
        comment: req.comment,
        created_at: Utc::now(),
    });
    course.updated_at = Utc::now();

    save_course(&state, &course).await?;

    Ok(Json(CourseResponse {
        success: true,
        course,
    }))
}

pub async fn get_all_courses(
    State(state): State<AppState>,
) -> Result<Json<CourseListResponse>, ApiError> {
    let courses = state.db.list_courses().await?;
    Ok(Json(CourseListResponse {
        success: true,
        courses,
    }))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let result = state
        .db
        .courses()
        .delete_one(doc! { "_id": &course_id }, None)
        .await?;

    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("Course not found".into()));
    }

    state
        .cache
        .delete_cache(&course_key(&course_id))
        .await
        .map_err(ApiError::Internal)?;

    tracing::info!(course_id = %course_id, "Course deleted");

    Ok(Json(MessageResponse::ok("Course deleted successfully")))
}
