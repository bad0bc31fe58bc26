//! Token pair lifecycle and session snapshot coordination.
//!
//! Tokens are stateless and cheap to verify; the cached snapshot is the single
//! point of instant revocation. Authentication always gates on snapshot
//! presence, so deleting the snapshot invalidates a still-unexpired access
//! token immediately.

use std::sync::Arc;

use crate::config::SESSION_TTL_SECONDS;
use crate::error::ApiError;
use crate::models::{Role, SanitizedUser};
use crate::services::jwt::{JwtService, TokenPair};
use crate::services::redis::{session_key, SessionStore};

#[derive(Clone)]
pub struct SessionService {
    jwt: JwtService,
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(jwt: JwtService, store: Arc<dyn SessionStore>) -> Self {
        Self { jwt, store }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Sign an access/refresh pair and write the snapshot with a 7-day TTL.
    ///
    /// The snapshot write happens before the tokens are handed back: a cache
    /// failure aborts the whole operation, so a client never holds tokens
    /// without a snapshot behind them.
    pub async fn issue_token_pair(&self, user: &SanitizedUser) -> Result<TokenPair, ApiError> {
        let access_token = self
            .jwt
            .generate_access_token(&user.id, user.role)
            .map_err(ApiError::Internal)?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&user.id)
            .map_err(ApiError::Internal)?;

        self.put_snapshot(user).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Decide authentication state for one request.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<SanitizedUser, ApiError> {
        let token = token.ok_or(ApiError::MissingCredential)?;

        let claims = self
            .jwt
            .validate_access_token(token)
            .map_err(|_| ApiError::InvalidCredential)?;

        let snapshot = self
            .store
            .get_cache(&session_key(&claims.sub))
            .await
            .map_err(ApiError::Internal)?
            // Absence means revoked or aged out; the client must refresh.
            .ok_or(ApiError::SessionExpired)?;

        let user: SanitizedUser = serde_json::from_str(&snapshot)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Corrupt session snapshot: {}", e)))?;

        Ok(user)
    }

    /// Rotate both tokens and rewrite the snapshot with a fresh TTL. The
    /// snapshot, not the refresh token itself, authorizes the rotation.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(TokenPair, SanitizedUser), ApiError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| ApiError::InvalidCredential)?;

        let snapshot = self
            .store
            .get_cache(&session_key(&claims.sub))
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::SessionExpired)?;

        let user: SanitizedUser = serde_json::from_str(&snapshot)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Corrupt session snapshot: {}", e)))?;

        let pair = self.issue_token_pair(&user).await?;
        Ok((pair, user))
    }

    /// Logout contract: drop the snapshot so every credential for this user
    /// fails with SessionExpired until the next login.
    pub async fn revoke(&self, user_id: &str) -> Result<(), ApiError> {
        self.store
            .delete_cache(&session_key(user_id))
            .await
            .map_err(ApiError::Internal)
    }

    /// Pure role predicate backing the admin-gated routes.
    pub fn authorize(user: &SanitizedUser, required: &[Role]) -> bool {
        required.contains(&user.role)
    }

    /// Rewrite the snapshot only when one exists. Admin mutations on other
    /// users go through here so a logged-out user's session is not recreated.
    pub async fn update_snapshot_if_present(&self, user: &SanitizedUser) -> Result<(), ApiError> {
        let existing = self
            .store
            .get_cache(&session_key(&user.id))
            .await
            .map_err(ApiError::Internal)?;
        if existing.is_some() {
            self.put_snapshot(user).await?;
        }
        Ok(())
    }

    /// Rewrite the snapshot (profile mutations keep the cache in step with the
    /// authoritative store).
    pub async fn put_snapshot(&self, user: &SanitizedUser) -> Result<(), ApiError> {
        let payload = serde_json::to_string(user)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Snapshot encode failed: {}", e)))?;
        self.store
            .set_cache(&session_key(&user.id), &payload, SESSION_TTL_SECONDS)
            .await
            .map_err(ApiError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::services::redis::MockSessionStore;

    fn test_session_service() -> SessionService {
        let jwt = JwtService::new(&JwtConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            activation_secret: "activation-secret".into(),
            access_token_expiry_minutes: 5,
            refresh_token_expiry_days: 3,
            activation_token_expiry_minutes: 5,
        });
        SessionService::new(jwt, Arc::new(MockSessionStore::new()))
    }

    fn member(id: &str) -> SanitizedUser {
        SanitizedUser {
            id: id.into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Member,
            avatar: None,
            courses: Vec::new(),
        }
    }

    #[tokio::test]
    async fn issue_then_authenticate_returns_same_principal() {
        let sessions = test_session_service();
        let user = member("u1");

        let pair = sessions.issue_token_pair(&user).await.unwrap();
        let authed = sessions
            .authenticate(Some(&pair.access_token))
            .await
            .unwrap();

        assert_eq!(authed.id, "u1");
        assert_eq!(authed.email, "ada@example.com");
    }

    #[tokio::test]
    async fn missing_token_fails_with_missing_credential() {
        let sessions = test_session_service();
        let err = sessions.authenticate(None).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[tokio::test]
    async fn garbage_token_fails_with_invalid_credential() {
        let sessions = test_session_service();
        let err = sessions
            .authenticate(Some("not-a-jwt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredential));
    }

    #[tokio::test]
    async fn revoke_defeats_unexpired_access_token() {
        let sessions = test_session_service();
        let user = member("u1");
        let pair = sessions.issue_token_pair(&user).await.unwrap();

        sessions.revoke("u1").await.unwrap();

        // Token is still signature-valid and unexpired, yet snapshot absence
        // is authoritative.
        let err = sessions
            .authenticate(Some(&pair.access_token))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
    }

    #[tokio::test]
    async fn refresh_rotates_both_tokens() {
        let sessions = test_session_service();
        let user = member("u1");
        let first = sessions.issue_token_pair(&user).await.unwrap();

        let (second, refreshed) = sessions.refresh(&first.refresh_token).await.unwrap();
        assert_eq!(refreshed.id, "u1");

        // New access token authenticates against the rewritten snapshot.
        let authed = sessions
            .authenticate(Some(&second.access_token))
            .await
            .unwrap();
        assert_eq!(authed.id, "u1");
    }

    #[tokio::test]
    async fn first_refresh_token_still_works_after_rotation() {
        // No reuse detection: both tokens of the pair rotate together but an
        // earlier refresh token stays valid while the snapshot exists.
        let sessions = test_session_service();
        let user = member("u1");
        let first = sessions.issue_token_pair(&user).await.unwrap();
        let _ = sessions.refresh(&first.refresh_token).await.unwrap();

        let again = sessions.refresh(&first.refresh_token).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn refresh_after_revoke_fails_with_session_expired() {
        let sessions = test_session_service();
        let user = member("u1");
        let pair = sessions.issue_token_pair(&user).await.unwrap();

        sessions.revoke("u1").await.unwrap();

        let err = sessions.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
    }

    #[tokio::test]
    async fn expired_refresh_token_fails_at_verification() {
        // Token verification runs before the snapshot lookup, so an expired
        // refresh token reads as InvalidCredential even when the snapshot is
        // gone too.
        let expired_jwt = JwtService::new(&JwtConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            activation_secret: "activation-secret".into(),
            access_token_expiry_minutes: 5,
            refresh_token_expiry_days: -1,
            activation_token_expiry_minutes: 5,
        });
        let stale = expired_jwt.generate_refresh_token("u1").unwrap();

        let sessions = test_session_service();
        let user = member("u1");
        sessions.issue_token_pair(&user).await.unwrap();
        sessions.revoke("u1").await.unwrap();

        let err = sessions.refresh(&stale).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredential));
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let sessions = test_session_service();
        let user = member("u1");
        let pair = sessions.issue_token_pair(&user).await.unwrap();

        let err = sessions.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredential));
    }

    #[tokio::test]
    async fn conditional_snapshot_update_does_not_resurrect_session() {
        let sessions = test_session_service();
        let user = member("u1");
        let pair = sessions.issue_token_pair(&user).await.unwrap();

        sessions.revoke("u1").await.unwrap();
        sessions.update_snapshot_if_present(&user).await.unwrap();

        let err = sessions
            .authenticate(Some(&pair.access_token))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
    }

    #[test]
    fn authorize_is_role_membership() {
        let mut user = member("u1");
        assert!(!SessionService::authorize(&user, &[Role::Admin]));
        assert!(SessionService::authorize(&user, &[Role::Member, Role::Admin]));
        user.role = Role::Admin;
        assert!(SessionService::authorize(&user, &[Role::Admin]));
        assert!(!SessionService::authorize(&user, &[]));
    }
}
