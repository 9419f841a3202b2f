//! Note repository
//!
//! Notes are addressed by slug. Every author-facing lookup is scoped by
//! `author_id`, so another user's note reads as missing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::db::{Backend, DynDatabasePool};
use crate::models::Note;

/// Note repository trait
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a note; `note.id` is ignored
    async fn create(&self, note: &Note) -> Result<Note>;

    /// Get a note by slug regardless of author
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>>;

    /// Get a note by slug only if `author_id` wrote it
    async fn get_for_author(&self, slug: &str, author_id: i64) -> Result<Option<Note>>;

    /// An author's notes in creation order
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>>;

    /// Whether any note other than `exclude_id` uses `slug`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Overwrite title, text and slug of an author's note
    async fn update(&self, note: &Note) -> Result<bool>;

    /// Delete an author's note by slug
    async fn delete(&self, slug: &str, author_id: i64) -> Result<bool>;

    /// Count all notes
    async fn count(&self) -> Result<i64>;
}

/// Note repository implementation
pub struct SqlxNoteRepository {
    pool: DynDatabasePool,
}

impl SqlxNoteRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NoteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NoteRepository for SqlxNoteRepository {
    async fn create(&self, note: &Note) -> Result<Note> {
        let id = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(INSERT)
                .bind(&note.title)
                .bind(&note.text)
                .bind(&note.slug)
                .bind(note.author_id)
                .execute(pool)
                .await
                .map(|r| r.last_insert_rowid()),
            Backend::Mysql(pool) => sqlx::query(INSERT)
                .bind(&note.title)
                .bind(&note.text)
                .bind(&note.slug)
                .bind(note.author_id)
                .execute(pool)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create note")?;

        Ok(Note { id, ..note.clone() })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_sqlite(pool, slug, None).await,
            Backend::Mysql(pool) => get_mysql(pool, slug, None).await,
        }
    }

    async fn get_for_author(&self, slug: &str, author_id: i64) -> Result<Option<Note>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_sqlite(pool, slug, Some(author_id)).await,
            Backend::Mysql(pool) => get_mysql(pool, slug, Some(author_id)).await,
        }
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_by_author_sqlite(pool, author_id).await,
            Backend::Mysql(pool) => list_by_author_mysql(pool, author_id).await,
        }
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        // Row IDs start at 1, so 0 excludes nothing
        let exclude_id = exclude_id.unwrap_or(0);
        let count: i64 = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query_scalar(SLUG_EXISTS)
                .bind(slug)
                .bind(exclude_id)
                .fetch_one(pool)
                .await,
            Backend::Mysql(pool) => sqlx::query_scalar(SLUG_EXISTS)
                .bind(slug)
                .bind(exclude_id)
                .fetch_one(pool)
                .await,
        }
        .context("Failed to check slug")?;

        Ok(count > 0)
    }

    async fn update(&self, note: &Note) -> Result<bool> {
        let affected = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(UPDATE)
                .bind(&note.title)
                .bind(&note.text)
                .bind(&note.slug)
                .bind(note.id)
                .bind(note.author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(pool) => sqlx::query(UPDATE)
                .bind(&note.title)
                .bind(&note.text)
                .bind(&note.slug)
                .bind(note.id)
                .bind(note.author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to update note")?;

        Ok(affected > 0)
    }

    async fn delete(&self, slug: &str, author_id: i64) -> Result<bool> {
        let affected = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(DELETE_FOR_AUTHOR)
                .bind(slug)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(pool) => sqlx::query(DELETE_FOR_AUTHOR)
                .bind(slug)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete note")?;

        Ok(affected > 0)
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query_scalar("SELECT COUNT(*) FROM notes")
                .fetch_one(pool)
                .await,
            Backend::Mysql(pool) => sqlx::query_scalar("SELECT COUNT(*) FROM notes")
                .fetch_one(pool)
                .await,
        }
        .context("Failed to count notes")
    }
}

const INSERT: &str = "INSERT INTO notes (title, text, slug, author_id) VALUES (?, ?, ?, ?)";

const SELECT_BY_SLUG: &str = "SELECT id, title, text, slug, author_id FROM notes WHERE slug = ?";

const SELECT_FOR_AUTHOR: &str =
    "SELECT id, title, text, slug, author_id FROM notes WHERE slug = ? AND author_id = ?";

const SELECT_BY_AUTHOR: &str =
    "SELECT id, title, text, slug, author_id FROM notes WHERE author_id = ? ORDER BY id ASC";

const SLUG_EXISTS: &str = "SELECT COUNT(*) FROM notes WHERE slug = ? AND id <> ?";

const UPDATE: &str =
    "UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ? AND author_id = ?";

const DELETE_FOR_AUTHOR: &str = "DELETE FROM notes WHERE slug = ? AND author_id = ?";

// SQLite implementations

async fn get_sqlite(pool: &SqlitePool, slug: &str, author_id: Option<i64>) -> Result<Option<Note>> {
    let row = match author_id {
        Some(author_id) => sqlx::query(SELECT_FOR_AUTHOR).bind(slug).bind(author_id),
        None => sqlx::query(SELECT_BY_SLUG).bind(slug),
    }
    .fetch_optional(pool)
    .await
    .context("Failed to get note")?;

    Ok(row.map(|r| row_to_note_sqlite(&r)))
}

async fn list_by_author_sqlite(pool: &SqlitePool, author_id: i64) -> Result<Vec<Note>> {
    let rows = sqlx::query(SELECT_BY_AUTHOR)
        .bind(author_id)
        .fetch_all(pool)
        .await
        .context("Failed to list notes")?;

    Ok(rows.iter().map(row_to_note_sqlite).collect())
}

fn row_to_note_sqlite(row: &sqlx::sqlite::SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}

// MySQL implementations

async fn get_mysql(pool: &MySqlPool, slug: &str, author_id: Option<i64>) -> Result<Option<Note>> {
    let row = match author_id {
        Some(author_id) => sqlx::query(SELECT_FOR_AUTHOR).bind(slug).bind(author_id),
        None => sqlx::query(SELECT_BY_SLUG).bind(slug),
    }
    .fetch_optional(pool)
    .await
    .context("Failed to get note")?;

    Ok(row.map(|r| row_to_note_mysql(&r)))
}

async fn list_by_author_mysql(pool: &MySqlPool, author_id: i64) -> Result<Vec<Note>> {
    let rows = sqlx::query(SELECT_BY_AUTHOR)
        .bind(author_id)
        .fetch_all(pool)
        .await
        .context("Failed to list notes")?;

    Ok(rows.iter().map(row_to_note_mysql).collect())
}

fn row_to_note_mysql(row: &sqlx::mysql::MySqlRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}
