//! News service
//!
//! Home page selection and admin publishing.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::NewsRepository;
use crate::models::{CreateNewsInput, FieldErrors, News, NEWS_TITLE_MAX_LENGTH};

/// Default number of news items on the home page
pub const NEWS_COUNT_ON_HOME_PAGE: usize = 10;

/// Field errors of a news submission, empty when it can be published
pub fn validate_news(input: &CreateNewsInput) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !errors.require("title", &input.title) {
        errors.max_length("title", input.title.trim(), NEWS_TITLE_MAX_LENGTH);
    }
    errors.require("text", &input.text);
    errors
}

/// Error types for news operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    #[error("News not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// News service
pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
    count_on_home_page: usize,
}

impl NewsService {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self::with_home_count(repo, NEWS_COUNT_ON_HOME_PAGE)
    }

    pub fn with_home_count(repo: Arc<dyn NewsRepository>, count_on_home_page: usize) -> Self {
        Self {
            repo,
            count_on_home_page,
        }
    }

    /// Newest news for the home page, capped at the configured count
    pub async fn home(&self) -> Result<Vec<News>, NewsServiceError> {
        let news = self
            .repo
            .list_latest(self.count_on_home_page as i64)
            .await
            .context("Failed to list news for home page")?;

        Ok(news)
    }

    /// Get a news item or `NotFound`
    pub async fn get(&self, id: i64) -> Result<News, NewsServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(id))
    }

    /// Publish a news item
    pub async fn create(&self, input: CreateNewsInput) -> Result<News, NewsServiceError> {
        validate_news(&input)
            .into_result()
            .map_err(NewsServiceError::Validation)?;

        let input = CreateNewsInput {
            title: input.title.trim().to_string(),
            ..input
        };

        let news = self.repo.create(&input).await.context("Failed to create news")?;
        tracing::info!(news_id = news.id, "News published");

        Ok(news)
    }
}
