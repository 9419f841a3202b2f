//! News model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest accepted news title
pub const NEWS_TITLE_MAX_LENGTH: usize = 200;

/// Published news item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Publication date
    pub date: NaiveDate,
}

/// Input for publishing a news item
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub text: String,
    /// Defaults to today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CreateNewsInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            date: None,
        }
    }

    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}
