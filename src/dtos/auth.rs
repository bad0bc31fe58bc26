use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::SanitizedUser;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub activation_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActivationRequest {
    #[validate(length(min = 1, message = "Activation token is required"))]
    pub activation_token: String,
    #[validate(length(equal = 4, message = "Activation code must be 4 digits"))]
    pub activation_code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SocialAuthRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub avatar: Option<String>,
}

/// Body for login/activation/social-auth/refresh; cookies carry the same tokens.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: SanitizedUser,
    pub access_token: String,
}
