use serde::Deserialize;
use std::env;

use crate::error::ApiError;

/// Session snapshot time-to-live: 7 days.
pub const SESSION_TTL_SECONDS: i64 = 604_800;
/// Course detail cache time-to-live: 7 days.
pub const COURSE_CACHE_TTL_SECONDS: i64 = 604_800;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub port: u16,
    pub origin: String,
    pub mongodb: MongoConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub cloudinary: CloudinaryConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

/// Signing secrets and lifetimes for the three token kinds.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub activation_secret: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
    pub activation_token_expiry_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str.parse().map_err(ApiError::Config)?;
        let is_prod = environment == Environment::Prod;

        let config = AppConfig {
            environment,
            service_name: get_env("SERVICE_NAME", Some("learnhub"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            port: get_env("PORT", Some("8000"), is_prod)?
                .parse()
                .map_err(|e: std::num::ParseIntError| ApiError::Config(e.to_string()))?,
            origin: get_env("ORIGIN", Some("http://localhost:3000"), is_prod)?,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("learnhub"), is_prod)?,
            },
            redis: RedisConfig {
                url: get_env("REDIS_URL", Some("redis://127.0.0.1:6379"), is_prod)?,
            },
            jwt: JwtConfig {
                access_secret: get_env("ACCESS_TOKEN_SECRET", None, is_prod)?,
                refresh_secret: get_env("REFRESH_TOKEN_SECRET", None, is_prod)?,
                activation_secret: get_env("ACTIVATION_SECRET", None, is_prod)?,
                access_token_expiry_minutes: parse_env(
                    "ACCESS_TOKEN_EXPIRY_MINUTES",
                    "5",
                    is_prod,
                )?,
                refresh_token_expiry_days: parse_env("REFRESH_TOKEN_EXPIRY_DAYS", "3", is_prod)?,
                activation_token_expiry_minutes: parse_env(
                    "ACTIVATION_TOKEN_EXPIRY_MINUTES",
                    "5",
                    is_prod,
                )?,
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                port: parse_env("SMTP_PORT", "587", is_prod)?,
                user: get_env("SMTP_USER", None, is_prod)?,
                password: get_env("SMTP_PASSWORD", None, is_prod)?,
                from_email: get_env("SMTP_FROM", None, is_prod)?,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: get_env("CLOUDINARY_CLOUD_NAME", Some(""), is_prod)?,
                upload_preset: get_env("CLOUDINARY_UPLOAD_PRESET", Some(""), is_prod)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.port == 0 {
            return Err(ApiError::Config("PORT must be greater than 0".into()));
        }
        if self.jwt.access_token_expiry_minutes <= 0 {
            return Err(ApiError::Config(
                "ACCESS_TOKEN_EXPIRY_MINUTES must be positive".into(),
            ));
        }
        if self.jwt.refresh_token_expiry_days <= 0 {
            return Err(ApiError::Config(
                "REFRESH_TOKEN_EXPIRY_DAYS must be positive".into(),
            ));
        }
        // Signing-key misconfiguration is fatal, never retried.
        for (name, secret) in [
            ("ACCESS_TOKEN_SECRET", &self.jwt.access_secret),
            ("REFRESH_TOKEN_SECRET", &self.jwt.refresh_secret),
            ("ACTIVATION_SECRET", &self.jwt.activation_secret),
        ] {
            if secret.is_empty() {
                return Err(ApiError::Config(format!("{} must not be empty", name)));
            }
        }
        if self.environment == Environment::Prod && self.origin == "*" {
            return Err(ApiError::Config(
                "Wildcard CORS origin not allowed in production".into(),
            ));
        }
        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, ApiError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(ApiError::Config(format!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(ApiError::Config(format!("{} is required but not set", key)))
            }
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: &str, is_prod: bool) -> Result<T, ApiError>
where
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), is_prod)?
        .parse()
        .map_err(|e: T::Err| ApiError::Config(format!("{}: {}", key, e)))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            environment: Environment::Dev,
            service_name: "learnhub".into(),
            log_level: "info".into(),
            port: 8000,
            origin: "http://localhost:3000".into(),
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".into(),
                database: "learnhub_test".into(),
            },
            redis: RedisConfig {
                url: "redis://127.0.0.1:6379".into(),
            },
            jwt: JwtConfig {
                access_secret: "access-secret".into(),
                refresh_secret: "refresh-secret".into(),
                activation_secret: "activation-secret".into(),
                access_token_expiry_minutes: 5,
                refresh_token_expiry_days: 3,
                activation_token_expiry_minutes: 5,
            },
            smtp: SmtpConfig {
                host: "smtp.gmail.com".into(),
                port: 587,
                user: "mailer@example.com".into(),
                password: "app-password".into(),
                from_email: "mailer@example.com".into(),
            },
            cloudinary: CloudinaryConfig {
                cloud_name: "demo".into(),
                upload_preset: "unsigned".into(),
            },
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn empty_signing_secret_is_fatal() {
        let mut config = test_config();
        config.jwt.access_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn wildcard_origin_rejected_in_prod() {
        let mut config = test_config();
        config.environment = Environment::Prod;
        config.origin = "*".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
        assert!("staging".parse::<Environment>().is_err());
    }
}
