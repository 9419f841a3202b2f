//! Comment service
//!
//! Comments are created by any logged-in user and edited or deleted only by
//! their author. A comment that belongs to someone else is reported as
//! `NotFound`, the same as one that does not exist.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput, FieldErrors};
use crate::services::moderation::validate_comment_text;

/// Error types for comment operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    news_repo: Arc<dyn NewsRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, news_repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo, news_repo }
    }

    /// Comments on a news item, oldest first
    pub async fn list_for_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>, CommentServiceError> {
        let comments = self
            .repo
            .list_by_news(news_id)
            .await
            .context("Failed to list comments")?;

        Ok(comments)
    }

    /// Add a comment to an existing news item. Surrounding whitespace is
    /// dropped from the text.
    pub async fn create(
        &self,
        news_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        self.news_repo
            .get_by_id(news_id)
            .await
            .context("Failed to get news")?
            .ok_or(CommentServiceError::NotFound)?;

        let text = text.trim();
        validate_comment_text(text).map_err(CommentServiceError::Validation)?;

        let comment = self
            .repo
            .create(&CreateCommentInput::new(news_id, author_id, text))
            .await
            .context("Failed to create comment")?;

        tracing::debug!(comment_id = comment.id, news_id, author_id, "Comment created");

        Ok(comment)
    }

    /// The author's own comment
    pub async fn get_for_author(&self, id: i64, author_id: i64) -> Result<Comment, CommentServiceError> {
        self.repo
            .get_for_author(id, author_id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)
    }

    /// Replace the text of the author's comment.
    ///
    /// Ownership is checked before the text, so a foreign comment is
    /// `NotFound` whatever was submitted.
    pub async fn update(
        &self,
        id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self.get_for_author(id, author_id).await?;

        let text = text.trim();
        validate_comment_text(text).map_err(CommentServiceError::Validation)?;

        let updated = self
            .repo
            .update_text(id, author_id, text)
            .await
            .context("Failed to update comment")?;
        if !updated {
            return Err(CommentServiceError::NotFound);
        }

        Ok(Comment {
            text: text.to_string(),
            ..comment
        })
    }

    /// Delete the author's comment, returning it
    pub async fn delete(&self, id: i64, author_id: i64) -> Result<Comment, CommentServiceError> {
        let comment = self.get_for_author(id, author_id).await?;

        let deleted = self
            .repo
            .delete(id, author_id)
            .await
            .context("Failed to delete comment")?;
        if !deleted {
            return Err(CommentServiceError::NotFound);
        }

        Ok(comment)
    }
}
