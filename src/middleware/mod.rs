pub mod auth;

pub use auth::{require_admin, require_auth, AuthUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
