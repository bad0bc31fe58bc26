use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::models::Role;

/// Signs and verifies the three token kinds, each with its own HS256 secret.
#[derive(Clone)]
pub struct JwtService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    activation_encoding: EncodingKey,
    activation_decoding: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
    activation_token_expiry_minutes: i64,
}

/// Claims for the short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user id)
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Claims for the refresh token; carries only the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Pending registration embedded in the activation token. The user document
/// does not exist until the code is confirmed; only the argon2 hash of the
/// password travels inside the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationClaims {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub code: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            activation_encoding: EncodingKey::from_secret(config.activation_secret.as_bytes()),
            activation_decoding: DecodingKey::from_secret(config.activation_secret.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
            activation_token_expiry_minutes: config.activation_token_expiry_minutes,
        }
    }

    pub fn generate_access_token(&self, user_id: &str, role: Role) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            role,
            exp: (now + Duration::minutes(self.access_token_expiry_minutes)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
    }

    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            sub: user_id.to_string(),
            exp: (now + Duration::days(self.refresh_token_expiry_days)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {}", e))
    }

    pub fn generate_activation_token(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        code: &str,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = ActivationClaims {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            code: code.to_string(),
            exp: (now + Duration::minutes(self.activation_token_expiry_minutes)).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.activation_encoding,
        )
        .map_err(|e| anyhow::anyhow!("Failed to encode activation token: {}", e))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, anyhow::Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<AccessTokenClaims>(token, &self.access_decoding, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?;
        Ok(data.claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, anyhow::Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<RefreshTokenClaims>(token, &self.refresh_decoding, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid refresh token: {}", e))?;
        Ok(data.claims)
    }

    pub fn validate_activation_token(&self, token: &str) -> Result<ActivationClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        let data = decode::<ActivationClaims>(token, &self.activation_decoding, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid activation token: {}", e))?;
        Ok(data.claims)
    }

    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }

    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.refresh_token_expiry_days * 24 * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt() -> JwtService {
        JwtService::new(&JwtConfig {
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            activation_secret: "activation-secret".into(),
            access_token_expiry_minutes: 5,
            refresh_token_expiry_days: 3,
            activation_token_expiry_minutes: 5,
        })
    }

    #[test]
    fn access_token_round_trips() {
        let jwt = test_jwt();
        let token = jwt.generate_access_token("user_123", Role::Member).unwrap();
        let claims = jwt.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.role, Role::Member);
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn refresh_token_round_trips() {
        let jwt = test_jwt();
        let token = jwt.generate_refresh_token("user_123").unwrap();
        let claims = jwt.validate_refresh_token(&token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.exp - claims.iat, 3 * 24 * 3600);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let jwt = test_jwt();
        let refresh = jwt.generate_refresh_token("user_123").unwrap();
        // An access-token check on a refresh token must fail: different secret.
        assert!(jwt.validate_access_token(&refresh).is_err());
    }

    #[test]
    fn activation_token_carries_pending_registration() {
        let jwt = test_jwt();
        let token = jwt
            .generate_activation_token("Ada", "ada@example.com", "$argon2$x", "4821")
            .unwrap();
        let claims = jwt.validate_activation_token(&token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.code, "4821");
        assert_eq!(claims.password_hash, "$argon2$x");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let jwt = test_jwt();
        let token = jwt.generate_access_token("user_123", Role::Admin).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(jwt.validate_access_token(&tampered).is_err());
    }
}
