//! User (principal) documents and their public projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Hosted image reference (avatar, course thumbnail).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub public_id: String,
    pub url: String,
}

/// Course enrollment reference embedded in the user document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseRef {
    pub course_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<ImageRef>,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
    /// Accounts created through the social-auth endpoint carry no password.
    #[serde(default)]
    pub is_social: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash: Some(password_hash),
            role: Role::Member,
            avatar: None,
            courses: Vec::new(),
            is_social: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_social(name: String, email: String, avatar: Option<ImageRef>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash: None,
            role: Role::Member,
            avatar,
            courses: Vec::new(),
            is_social: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.courses.iter().any(|c| c.course_id == course_id)
    }

    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
            courses: self.courses.clone(),
        }
    }
}

/// Public projection of a user; also the session snapshot payload cached in
/// Redis. The persistent store stays authoritative, this copy only gates
/// authentication and revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<ImageRef>,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
}

impl SanitizedUser {
    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.courses.iter().any(|c| c.course_id == course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_drops_password_hash() {
        let user = User::new("Ada".into(), "ada@example.com".into(), "$argon2$x".into());
        let json = serde_json::to_value(user.sanitized()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn enrollment_check_matches_course_refs() {
        let mut user = User::new("Ada".into(), "ada@example.com".into(), "h".into());
        assert!(!user.is_enrolled("c1"));
        user.courses.push(CourseRef {
            course_id: "c1".into(),
        });
        assert!(user.is_enrolled("c1"));
        assert!(!user.is_enrolled("c2"));
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Member.as_str(), "member");
        assert!("root".parse::<Role>().is_err());
    }
}
