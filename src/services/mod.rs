pub mod auth;
pub mod database;
pub mod email;
pub mod jwt;
pub mod redis;
pub mod session;
pub mod sweeper;
pub mod upload;

pub use auth::AuthService;
pub use database::MongoDb;
pub use email::{EmailProvider, EmailService, MockEmailService};
pub use jwt::{JwtService, TokenPair};
pub use redis::{course_key, session_key, MockSessionStore, RedisService, SessionStore};
pub use session::SessionService;
pub use sweeper::spawn_notification_sweeper;
pub use upload::{CloudinaryUploader, MockUploader, UploadProvider};
