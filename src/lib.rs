pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::AppConfig;
use error::ApiError;
use services::{
    AuthService, EmailProvider, MongoDb, SessionService, SessionStore, UploadProvider,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: MongoDb,
    pub sessions: SessionService,
    pub auth: AuthService,
    pub email: Arc<dyn EmailProvider>,
    pub uploads: Arc<dyn UploadProvider>,
    pub cache: Arc<dyn SessionStore>,
}

pub fn build_router(state: AppState) -> Result<Router, ApiError> {
    let origin = state
        .config
        .origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Config(format!("Invalid ORIGIN: {}", e)))?;

    // Cookie transport requires credentialed CORS, which rules out wildcards.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let public = Router::new()
        .route("/registration", post(handlers::auth::registration))
        .route("/activate-user", post(handlers::auth::activate_user))
        .route("/login", post(handlers::auth::login))
        .route("/social-auth", post(handlers::auth::social_auth))
        .route("/refreshtoken", get(handlers::auth::refresh_token))
        .route("/get-course/:id", get(handlers::course::get_course))
        .route("/get-courses", get(handlers::course::get_courses))
        .route("/test", get(handlers::health::health));

    let protected = Router::new()
        .route("/logout", get(handlers::auth::logout))
        .route("/me", get(handlers::user::me))
        .route("/update-user-info", put(handlers::user::update_user_info))
        .route(
            "/update-user-password",
            put(handlers::user::update_user_password),
        )
        .route(
            "/update-user-avatar",
            put(handlers::user::update_user_avatar),
        )
        .route(
            "/enroll/user/:user_id/course/:course_id",
            put(handlers::user::enroll),
        )
        .route(
            "/get-course-content/:id",
            get(handlers::course::get_course_content),
        )
        .route("/add-question", put(handlers::course::add_question))
        .route("/add-answer", put(handlers::course::add_answer))
        .route("/add-review/:course_id", post(handlers::course::add_review))
        .route("/create-order", post(handlers::order::create_order))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let admin = Router::new()
        .route("/create-course", post(handlers::course::create_course))
        .route("/edit-course/:id", put(handlers::course::edit_course))
        .route("/get-all-courses", get(handlers::course::get_all_courses))
        .route(
            "/delete-course/:id",
            delete(handlers::course::delete_course),
        )
        .route(
            "/add-reply-review",
            post(handlers::course::add_reply_review),
        )
        .route("/get-all-users", get(handlers::user::get_all_users))
        .route("/update-user-role", put(handlers::user::update_user_role))
        .route("/delete-user/:id", delete(handlers::user::delete_user))
        .route("/get-all-orders", get(handlers::order::get_all_orders))
        .route(
            "/get-all-notifications",
            get(handlers::notification::get_all_notifications),
        )
        .route(
            "/update-notification/:id",
            put(handlers::notification::update_notification),
        )
        .route("/create-layout", post(handlers::layout::create_layout))
        .route("/update-layout", put(handlers::layout::update_layout))
        .route("/get-layout/:kind", get(handlers::layout::get_layout))
        // Outer layer runs first: authenticate, then check the role.
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let api = public.merge(protected).merge(admin);

    Ok(Router::new()
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "message": "Route not found",
        })),
    )
}
