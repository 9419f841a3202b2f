//! Data models
//!
//! Entities, form inputs and validation errors shared by the news and notes
//! sites:
//! - News and Comment (news site)
//! - Note (notes site)
//! - User and Session (both sites)

mod comment;
mod form;
mod news;
mod note;
mod session;
mod user;

pub use comment::{Comment, CommentWithAuthor, CreateCommentInput};
pub use form::{FieldErrors, REQUIRED_FIELD};
pub use news::{CreateNewsInput, News, NEWS_TITLE_MAX_LENGTH};
pub use note::{Note, NoteInput, NOTE_SLUG_MAX_LENGTH, NOTE_TITLE_MAX_LENGTH};
pub use session::Session;
pub use user::{User, UserRole, USERNAME_MAX_LENGTH};
