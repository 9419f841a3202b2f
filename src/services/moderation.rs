//! Comment text moderation
//!
//! Rejects comments that are blank or contain a denylisted word. Matching is
//! case-sensitive substring containment, so "редиска" also matches inside
//! "редискам" but "Редиска" passes.

use crate::models::{FieldErrors, REQUIRED_FIELD};

/// Words a comment may not contain
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Message shown when a comment contains one of `BAD_WORDS`
pub const WARNING: &str = "Не ругайтесь!";

/// Check comment text, returning the message to show on rejection
pub fn check_text(text: &str) -> Result<(), &'static str> {
    if text.trim().is_empty() {
        return Err(REQUIRED_FIELD);
    }
    if BAD_WORDS.iter().any(|word| text.contains(word)) {
        return Err(WARNING);
    }
    Ok(())
}

/// `check_text` reported against the `text` form field
pub fn validate_comment_text(text: &str) -> Result<(), FieldErrors> {
    check_text(text).map_err(|message| FieldErrors::single("text", message))
}
