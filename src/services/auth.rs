//! Registration, activation and login flows.
//!
//! Registration creates no user document. The pending account travels inside
//! the activation token (argon2 hash, never the plaintext password) and the
//! document is written only when the 4-digit code checks out.

use rand::Rng;
use std::sync::Arc;

use crate::dtos::auth::{ActivationRequest, LoginRequest, RegisterRequest, SocialAuthRequest};
use crate::error::ApiError;
use crate::models::{ImageRef, SanitizedUser, User};
use crate::services::email::EmailProvider;
use crate::services::jwt::TokenPair;
use crate::services::session::SessionService;
use crate::services::MongoDb;
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

#[derive(Clone)]
pub struct AuthService {
    db: MongoDb,
    email: Arc<dyn EmailProvider>,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(db: MongoDb, email: Arc<dyn EmailProvider>, sessions: SessionService) -> Self {
        Self {
            db,
            email,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Start registration: conflict-check, then email a 4-digit code and hand
    /// back the activation token that carries the pending account.
    pub async fn register(&self, req: RegisterRequest) -> Result<String, ApiError> {
        let email = req.email.to_lowercase();

        if self.db.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict("Email already exists".into()));
        }

        let password_hash = hash_password(&Password::new(req.password))
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Password hashing error: {}", e)))?;

        let code = generate_activation_code();
        let token = self
            .sessions
            .jwt()
            .generate_activation_token(&req.name, &email, password_hash.as_str(), &code)
            .map_err(ApiError::Internal)?;

        self.email
            .send_activation_email(&email, &req.name, &code)
            .await?;

        tracing::info!(email = %email, "Activation email sent");

        Ok(token)
    }

    /// Complete registration: verify the token and code, create the user and
    /// open a session.
    pub async fn activate(
        &self,
        req: ActivationRequest,
    ) -> Result<(TokenPair, SanitizedUser), ApiError> {
        let claims = self
            .sessions
            .jwt()
            .validate_activation_token(&req.activation_token)
            .map_err(|_| ApiError::InvalidCredential)?;

        if claims.code != req.activation_code {
            return Err(ApiError::Validation("Invalid activation code".into()));
        }

        // The conflict window reopens between registration and activation.
        if self.db.find_user_by_email(&claims.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already exists".into()));
        }

        let user = User::new(claims.name, claims.email, claims.password_hash);
        self.db.users().insert_one(&user, None).await?;

        tracing::info!(user_id = %user.id, "User activated");

        let sanitized = user.sanitized();
        let pair = self.sessions.issue_token_pair(&sanitized).await?;
        Ok((pair, sanitized))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<(TokenPair, SanitizedUser), ApiError> {
        let user = self
            .db
            .find_user_by_email(&req.email)
            .await?
            .ok_or(ApiError::InvalidCredential)?;

        // Social accounts carry no local password.
        let stored_hash = user
            .password_hash
            .clone()
            .ok_or(ApiError::InvalidCredential)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(stored_hash),
        )
        .map_err(|_| ApiError::InvalidCredential)?;

        tracing::info!(user_id = %user.id, "User logged in");

        let sanitized = user.sanitized();
        let pair = self.sessions.issue_token_pair(&sanitized).await?;
        Ok((pair, sanitized))
    }

    /// Trusted-provider login: find or create the account, no password involved.
    pub async fn social_auth(
        &self,
        req: SocialAuthRequest,
    ) -> Result<(TokenPair, SanitizedUser), ApiError> {
        let email = req.email.to_lowercase();

        let user = match self.db.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                let avatar = req.avatar.map(|url| ImageRef {
                    public_id: String::new(),
                    url,
                });
                let user = User::new_social(req.name, email, avatar);
                self.db.users().insert_one(&user, None).await?;
                tracing::info!(user_id = %user.id, "Social user created");
                user
            }
        };

        let sanitized = user.sanitized();
        let pair = self.sessions.issue_token_pair(&sanitized).await?;
        Ok((pair, sanitized))
    }

    pub async fn logout(&self, user_id: &str) -> Result<(), ApiError> {
        self.sessions.revoke(user_id).await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}

fn generate_activation_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:04}", rng.gen_range(0..10_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_code_is_four_digits() {
        for _ in 0..100 {
            let code = generate_activation_code();
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
