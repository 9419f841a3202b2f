//! News repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::db::{Backend, DynDatabasePool};
use crate::models::{CreateNewsInput, News};

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Publish a news item
    async fn create(&self, input: &CreateNewsInput) -> Result<News>;

    /// Get a news item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Newest first by date, then by ID
    async fn list_latest(&self, limit: i64) -> Result<Vec<News>>;

    /// Count all news
    async fn count(&self) -> Result<i64>;
}

/// News repository implementation
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<News> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_sqlite(pool, input).await,
            Backend::Mysql(pool) => create_mysql(pool, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_by_id_mysql(pool, id).await,
        }
    }

    async fn list_latest(&self, limit: i64) -> Result<Vec<News>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_latest_sqlite(pool, limit).await,
            Backend::Mysql(pool) => list_latest_mysql(pool, limit).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        let row = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query("SELECT COUNT(*) as count FROM news")
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
            Backend::Mysql(pool) => sqlx::query("SELECT COUNT(*) as count FROM news")
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
        };
        row.context("Failed to count news")
    }
}

const SELECT_BY_ID: &str = "SELECT id, title, text, date FROM news WHERE id = ?";

const SELECT_LATEST: &str = r#"
    SELECT id, title, text, date
    FROM news
    ORDER BY date DESC, id DESC
    LIMIT ?
"#;

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, input: &CreateNewsInput) -> Result<News> {
    let date = input.date.unwrap_or_else(|| Utc::now().date_naive());

    let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
        .bind(&input.title)
        .bind(&input.text)
        .bind(date)
        .execute(pool)
        .await
        .context("Failed to create news")?;

    Ok(News {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        text: input.text.clone(),
        date,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<News>> {
    let row = sqlx::query(SELECT_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by ID")?;

    Ok(row.map(|r| row_to_news_sqlite(&r)))
}

async fn list_latest_sqlite(pool: &SqlitePool, limit: i64) -> Result<Vec<News>> {
    let rows = sqlx::query(SELECT_LATEST)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to list news")?;

    Ok(rows.iter().map(row_to_news_sqlite).collect())
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date: row.get("date"),
    }
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, input: &CreateNewsInput) -> Result<News> {
    let date = input.date.unwrap_or_else(|| Utc::now().date_naive());

    let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
        .bind(&input.title)
        .bind(&input.text)
        .bind(date)
        .execute(pool)
        .await
        .context("Failed to create news")?;

    Ok(News {
        id: result.last_insert_id() as i64,
        title: input.title.clone(),
        text: input.text.clone(),
        date,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<News>> {
    let row = sqlx::query(SELECT_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by ID")?;

    Ok(row.map(|r| row_to_news_mysql(&r)))
}

async fn list_latest_mysql(pool: &MySqlPool, limit: i64) -> Result<Vec<News>> {
    let rows = sqlx::query(SELECT_LATEST)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to list news")?;

    Ok(rows.iter().map(row_to_news_mysql).collect())
}

fn row_to_news_mysql(row: &sqlx::mysql::MySqlRow) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date: row.get("date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, NaiveDate};

    async fn setup() -> SqlxNewsRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxNewsRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_defaults_to_today() {
        let repo = setup().await;

        let news = repo
            .create(&CreateNewsInput::new("Заголовок", "Текст"))
            .await
            .expect("Failed to create news");

        assert!(news.id > 0);
        assert_eq!(news.date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_get_by_id_roundtrips_date() {
        let repo = setup().await;
        let date = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
        let created = repo
            .create(&CreateNewsInput::new("Заголовок", "Текст").dated(date))
            .await
            .unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().expect("News not found");

        assert_eq!(found, created);
        assert!(repo.get_by_id(created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_latest_orders_and_limits() {
        let repo = setup().await;
        let today = Utc::now().date_naive();
        for index in 0..5 {
            repo.create(
                &CreateNewsInput::new(format!("Новость {}", index), "Просто текст.")
                    .dated(today - Duration::days(index)),
            )
            .await
            .unwrap();
        }

        let latest = repo.list_latest(3).await.unwrap();

        assert_eq!(latest.len(), 3);
        assert_eq!(latest[0].date, today);
        assert!(latest.windows(2).all(|w| w[0].date >= w[1].date));
        assert_eq!(repo.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_same_date_breaks_ties_by_newest_id() {
        let repo = setup().await;
        let first = repo.create(&CreateNewsInput::new("A", "a")).await.unwrap();
        let second = repo.create(&CreateNewsInput::new("B", "b")).await.unwrap();

        let latest = repo.list_latest(10).await.unwrap();

        assert_eq!(latest[0].id, second.id);
        assert_eq!(latest[1].id, first.id);
    }
}
