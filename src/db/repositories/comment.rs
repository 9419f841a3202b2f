//! Comment repository
//!
//! Writes are scoped by author: `update_text` and `delete` only touch a row
//! whose `author_id` matches, and report whether one was found.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get a comment only if `author_id` wrote it
    async fn get_for_author(&self, id: i64, author_id: i64) -> Result<Option<Comment>>;

    /// Comments on a news item, oldest first
    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Replace the text of an author's comment
    async fn update_text(&self, id: i64, author_id: i64, text: &str) -> Result<bool>;

    /// Delete an author's comment
    async fn delete(&self, id: i64, author_id: i64) -> Result<bool>;

    /// Count all comments
    async fn count(&self) -> Result<i64>;
}

/// Comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_sqlite(pool, input).await,
            Backend::Mysql(pool) => create_mysql(pool, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_sqlite(pool, SELECT_BY_ID, id, None).await,
            Backend::Mysql(pool) => get_mysql(pool, SELECT_BY_ID, id, None).await,
        }
    }

    async fn get_for_author(&self, id: i64, author_id: i64) -> Result<Option<Comment>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_sqlite(pool, SELECT_FOR_AUTHOR, id, Some(author_id)).await,
            Backend::Mysql(pool) => get_mysql(pool, SELECT_FOR_AUTHOR, id, Some(author_id)).await,
        }
    }

    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_by_news_sqlite(pool, news_id).await,
            Backend::Mysql(pool) => list_by_news_mysql(pool, news_id).await,
        }
    }

    async fn update_text(&self, id: i64, author_id: i64, text: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(UPDATE_TEXT)
                .bind(text)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(pool) => sqlx::query(UPDATE_TEXT)
                .bind(text)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to update comment")?;

        Ok(affected > 0)
    }

    async fn delete(&self, id: i64, author_id: i64) -> Result<bool> {
        let affected = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(DELETE_FOR_AUTHOR)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(pool) => sqlx::query(DELETE_FOR_AUTHOR)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete comment")?;

        Ok(affected > 0)
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query_scalar("SELECT COUNT(*) FROM comments")
                .fetch_one(pool)
                .await,
            Backend::Mysql(pool) => sqlx::query_scalar("SELECT COUNT(*) FROM comments")
                .fetch_one(pool)
                .await,
        }
        .context("Failed to count comments")
    }
}

const INSERT: &str = "INSERT INTO comments (news_id, author_id, text, created) VALUES (?, ?, ?, ?)";

const SELECT_BY_ID: &str =
    "SELECT id, news_id, author_id, text, created FROM comments WHERE id = ?";

const SELECT_FOR_AUTHOR: &str =
    "SELECT id, news_id, author_id, text, created FROM comments WHERE id = ? AND author_id = ?";

const SELECT_BY_NEWS: &str = r#"
    SELECT c.id, c.news_id, c.author_id, c.text, c.created, u.username AS author_username
    FROM comments c
    JOIN users u ON u.id = c.author_id
    WHERE c.news_id = ?
    ORDER BY c.created ASC, c.id ASC
"#;

const UPDATE_TEXT: &str = "UPDATE comments SET text = ? WHERE id = ? AND author_id = ?";

const DELETE_FOR_AUTHOR: &str = "DELETE FROM comments WHERE id = ? AND author_id = ?";

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, input: &CreateCommentInput) -> Result<Comment> {
    let created = input.created.unwrap_or_else(Utc::now);

    let result = sqlx::query(INSERT)
        .bind(input.news_id)
        .bind(input.author_id)
        .bind(&input.text)
        .bind(created)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        news_id: input.news_id,
        author_id: input.author_id,
        text: input.text.clone(),
        created,
    })
}

async fn get_sqlite(
    pool: &SqlitePool,
    sql: &str,
    id: i64,
    author_id: Option<i64>,
) -> Result<Option<Comment>> {
    let mut query = sqlx::query(sql).bind(id);
    if let Some(author_id) = author_id {
        query = query.bind(author_id);
    }

    let row = query
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;

    Ok(row.map(|r| row_to_comment_sqlite(&r)))
}

async fn list_by_news_sqlite(pool: &SqlitePool, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(SELECT_BY_NEWS)
        .bind(news_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|r| CommentWithAuthor {
            comment: row_to_comment_sqlite(r),
            author_username: r.get("author_username"),
        })
        .collect())
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created: row.get("created"),
    }
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, input: &CreateCommentInput) -> Result<Comment> {
    let created = input.created.unwrap_or_else(Utc::now);

    let result = sqlx::query(INSERT)
        .bind(input.news_id)
        .bind(input.author_id)
        .bind(&input.text)
        .bind(created)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        news_id: input.news_id,
        author_id: input.author_id,
        text: input.text.clone(),
        created,
    })
}

async fn get_mysql(
    pool: &MySqlPool,
    sql: &str,
    id: i64,
    author_id: Option<i64>,
) -> Result<Option<Comment>> {
    let mut query = sqlx::query(sql).bind(id);
    if let Some(author_id) = author_id {
        query = query.bind(author_id);
    }

    let row = query
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;

    Ok(row.map(|r| row_to_comment_mysql(&r)))
}

async fn list_by_news_mysql(pool: &MySqlPool, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(SELECT_BY_NEWS)
        .bind(news_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|r| CommentWithAuthor {
            comment: row_to_comment_mysql(r),
            author_username: r.get("author_username"),
        })
        .collect())
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created: row.get("created"),
    }
}
