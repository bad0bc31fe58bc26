//! Registration, activation, login, token refresh and logout endpoints.
//!
//! Tokens travel as http-only cookies; the access token is additionally
//! returned in the body for clients that prefer an Authorization header.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::dtos::auth::{
    ActivationRequest, AuthResponse, LoginRequest, RegisterRequest, RegisterResponse,
    SocialAuthRequest,
};
use crate::dtos::MessageResponse;
use crate::error::ApiError;
use crate::middleware::{AuthUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::services::TokenPair;
use crate::utils::ValidatedJson;
use crate::AppState;

fn build_cookie(name: &'static str, value: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(0))
        .build()
}

/// Attach both token cookies with lifetimes matching the tokens themselves.
fn with_token_cookies(jar: CookieJar, state: &AppState, pair: &TokenPair) -> CookieJar {
    let jwt = state.sessions.jwt();
    jar.add(build_cookie(
        ACCESS_TOKEN_COOKIE,
        pair.access_token.clone(),
        jwt.access_token_expiry_seconds(),
    ))
    .add(build_cookie(
        REFRESH_TOKEN_COOKIE,
        pair.refresh_token.clone(),
        jwt.refresh_token_expiry_seconds(),
    ))
}

pub async fn registration(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let email = req.email.clone();
    let activation_token = state.auth.register(req).await?;

    Ok(Json(RegisterResponse {
        success: true,
        message: format!("Please check your email {} to activate your account", email),
        activation_token,
    }))
}

pub async fn activate_user(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<ActivationRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let (pair, user) = state.auth.activate(req).await?;
    let jar = with_token_cookies(jar, &state, &pair);

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user,
            access_token: pair.access_token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let (pair, user) = state.auth.login(req).await?;
    let jar = with_token_cookies(jar, &state, &pair);

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user,
            access_token: pair.access_token,
        }),
    ))
}

pub async fn social_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SocialAuthRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let (pair, user) = state.auth.social_auth(req).await?;
    let jar = with_token_cookies(jar, &state, &pair);

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user,
            access_token: pair.access_token,
        }),
    ))
}

/// Rotates both tokens against the snapshot, never against the access token.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let refresh = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::MissingCredential)?;

    let (pair, user) = state.sessions.refresh(&refresh).await?;
    let jar = with_token_cookies(jar, &state, &pair);

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user,
            access_token: pair.access_token,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    state.auth.logout(&user.id).await?;

    let jar = jar
        .add(removal_cookie(ACCESS_TOKEN_COOKIE))
        .add(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((jar, Json(MessageResponse::ok("Logged out successfully"))))
}
