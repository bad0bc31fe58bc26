//! Shared setup for integration tests.
//!
//! The Mongo client connects lazily, so router tests that never touch a
//! collection run without a live database. Tests that do need MongoDB are
//! marked `#[ignore]` and expect a local instance.

#![allow(dead_code)]

use learnhub::{
    config::{
        AppConfig, CloudinaryConfig, Environment, JwtConfig, MongoConfig, RedisConfig, SmtpConfig,
    },
    models::{Role, SanitizedUser},
    services::{
        AuthService, JwtService, MockEmailService, MockSessionStore, MockUploader, MongoDb,
        SessionService, SessionStore, TokenPair,
    },
    AppState,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Dev,
        service_name: "learnhub-test".to_string(),
        log_level: "debug".to_string(),
        port: 0,
        origin: "http://localhost:3000".to_string(),
        mongodb: MongoConfig {
            // Short server-selection timeout so tests that hit a missing
            // database fail fast instead of hanging.
            uri: std::env::var("TEST_MONGODB_URI").unwrap_or_else(|_| {
                "mongodb://localhost:27017/?serverSelectionTimeoutMS=2000".to_string()
            }),
            database: "learnhub_test".to_string(),
        },
        redis: RedisConfig {
            url: "redis://localhost:6379".to_string(),
        },
        jwt: JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            activation_secret: "test-activation-secret".to_string(),
            access_token_expiry_minutes: 5,
            refresh_token_expiry_days: 3,
            activation_token_expiry_minutes: 5,
        },
        smtp: SmtpConfig {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            user: "test@example.com".to_string(),
            password: "test-password".to_string(),
            from_email: "test@example.com".to_string(),
        },
        cloudinary: CloudinaryConfig {
            cloud_name: "test".to_string(),
            upload_preset: "unsigned".to_string(),
        },
    }
}

/// Application state on mock providers; database queries require a live Mongo.
pub async fn test_state() -> AppState {
    let config = test_config();

    let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
        .await
        .expect("Failed to create Mongo client");

    let store: Arc<dyn SessionStore> = Arc::new(MockSessionStore::new());
    let jwt = JwtService::new(&config.jwt);
    let sessions = SessionService::new(jwt, store.clone());
    let email = Arc::new(MockEmailService);
    let auth = AuthService::new(db.clone(), email.clone(), sessions.clone());

    AppState {
        config,
        db,
        sessions,
        auth,
        email,
        uploads: Arc::new(MockUploader),
        cache: store,
    }
}

pub fn member_user() -> SanitizedUser {
    SanitizedUser {
        id: Uuid::new_v4().to_string(),
        name: "Test Member".to_string(),
        email: format!("member-{}@example.com", Uuid::new_v4()),
        role: Role::Member,
        avatar: None,
        courses: Vec::new(),
    }
}

pub fn admin_user() -> SanitizedUser {
    SanitizedUser {
        role: Role::Admin,
        ..member_user()
    }
}

/// Open a session directly, bypassing the login handler.
pub async fn open_session(state: &AppState, user: &SanitizedUser) -> TokenPair {
    state
        .sessions
        .issue_token_pair(user)
        .await
        .expect("Failed to issue token pair")
}
