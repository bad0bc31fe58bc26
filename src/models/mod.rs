pub mod course;
pub mod layout;
pub mod notification;
pub mod order;
pub mod user;

pub use course::{Course, CourseSection, Question, QuestionReply, Review, ReviewReply, SectionLink, TitleItem};
pub use layout::{Banner, Category, FaqItem, Layout, LayoutKind};
pub use notification::{Notification, NotificationStatus};
pub use order::Order;
pub use user::{CourseRef, ImageRef, Role, SanitizedUser, User};
