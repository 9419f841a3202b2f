//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - Implementing business rules (moderation, slugs, ownership)
//! - Validating form input into per-field errors
//! - Managing accounts and sessions

pub mod comment;
pub mod moderation;
pub mod news;
pub mod note;
pub mod password;
pub mod slug;
pub mod user;

pub use comment::{CommentService, CommentServiceError};
pub use moderation::{check_text, BAD_WORDS};
pub use news::{validate_news, NewsService, NewsServiceError, NEWS_COUNT_ON_HOME_PAGE};
pub use note::{NoteService, NoteServiceError};
pub use password::{hash_password, verify_password};
pub use slug::slugify;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
