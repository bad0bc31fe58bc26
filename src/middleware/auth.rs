//! Cookie-based request authentication.
//!
//! The access token rides in the `access_token` cookie. Verification is token
//! signature plus session snapshot presence; the resolved principal is stored
//! in request extensions for handlers to extract.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::models::{Role, SanitizedUser};
use crate::services::SessionService;
use crate::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string());

    let user = state.sessions.authenticate(token.as_deref()).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Layered after `require_auth`; rejects non-admin principals.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<SanitizedUser>()
        .ok_or(ApiError::MissingCredential)?;

    if !SessionService::authorize(user, &[Role::Admin]) {
        return Err(ApiError::Forbidden(format!(
            "Role {} is not allowed to access this resource",
            user.role
        )));
    }

    Ok(next.run(req).await)
}

/// Extracts the authenticated principal placed by `require_auth`.
pub struct AuthUser(pub SanitizedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SanitizedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::MissingCredential)
    }
}
