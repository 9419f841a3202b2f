//! Shared setup for the route tests: an app over a fresh in-memory database
//! plus helpers for users, sessions and fixtures.

#![allow(dead_code)]

use axum::http::{header, HeaderName, HeaderValue};
use axum_test::{TestRequest, TestResponse, TestServer};
use chrono::{DateTime, NaiveDate, Utc};

use ya_sites::api::{build_router, build_state, AppState};
use ya_sites::config::Config;
use ya_sites::db::repositories::{
    CommentRepository, NewsRepository, NoteRepository, SqlxCommentRepository, SqlxNewsRepository,
    SqlxNoteRepository, SqlxUserRepository, UserRepository,
};
use ya_sites::db::{create_test_pool, migrations};
use ya_sites::models::{
    Comment, CreateCommentInput, CreateNewsInput, News, Note, User, UserRole,
};

/// Password hash that never verifies; tests log in through sessions directly
const UNUSABLE_HASH: &str = "!";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// A user together with the cookie header of a live session
pub struct Client {
    pub user: User,
    pub cookie: HeaderValue,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Config::default()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = build_state(pool, &config).expect("Failed to build state");
    let server = TestServer::new(build_router(state.clone())).expect("Failed to start test server");

    TestApp { server, state }
}

impl TestApp {
    pub fn users(&self) -> SqlxUserRepository {
        SqlxUserRepository::new(self.state.pool.clone())
    }

    pub fn news_repo(&self) -> SqlxNewsRepository {
        SqlxNewsRepository::new(self.state.pool.clone())
    }

    pub fn comment_repo(&self) -> SqlxCommentRepository {
        SqlxCommentRepository::new(self.state.pool.clone())
    }

    pub fn note_repo(&self) -> SqlxNoteRepository {
        SqlxNoteRepository::new(self.state.pool.clone())
    }

    pub async fn create_user(&self, username: &str, role: UserRole) -> User {
        self.users()
            .create(&User::new(username.to_string(), UNUSABLE_HASH.to_string(), role))
            .await
            .expect("Failed to create user")
    }

    /// Create a user and log them in
    pub async fn client(&self, username: &str) -> Client {
        self.client_with_role(username, UserRole::User).await
    }

    pub async fn client_with_role(&self, username: &str, role: UserRole) -> Client {
        let user = self.create_user(username, role).await;
        let session = self
            .state
            .user_service
            .start_session(user.id)
            .await
            .expect("Failed to start session");
        let cookie = HeaderValue::from_str(&format!("session={}", session.id))
            .expect("Session id is a valid header value");

        Client { user, cookie }
    }

    pub async fn create_news(&self, title: &str, date: Option<NaiveDate>) -> News {
        let mut input = CreateNewsInput::new(title, "Просто текст.");
        input.date = date;
        self.news_repo()
            .create(&input)
            .await
            .expect("Failed to create news")
    }

    pub async fn create_comment(
        &self,
        news: &News,
        author: &User,
        text: &str,
        created: Option<DateTime<Utc>>,
    ) -> Comment {
        let mut input = CreateCommentInput::new(news.id, author.id, text);
        input.created = created;
        self.comment_repo()
            .create(&input)
            .await
            .expect("Failed to create comment")
    }

    pub async fn create_note(&self, author: &User, title: &str, slug: &str) -> Note {
        self.note_repo()
            .create(&Note {
                id: 0,
                title: title.to_string(),
                text: "Текст заметки".to_string(),
                slug: slug.to_string(),
                author_id: author.id,
            })
            .await
            .expect("Failed to create note")
    }

    pub async fn comment_count(&self) -> i64 {
        self.comment_repo().count().await.expect("Failed to count comments")
    }

    pub async fn note_count(&self) -> i64 {
        self.note_repo().count().await.expect("Failed to count notes")
    }

    pub fn get(&self, path: &str, client: Option<&Client>) -> TestRequest {
        with_session(self.server.get(path), client)
    }

    pub fn post(&self, path: &str, client: Option<&Client>) -> TestRequest {
        with_session(self.server.post(path), client)
    }

    pub fn delete(&self, path: &str, client: Option<&Client>) -> TestRequest {
        with_session(self.server.delete(path), client)
    }
}

fn with_session(request: TestRequest, client: Option<&Client>) -> TestRequest {
    match client {
        Some(client) => request.add_header(header::COOKIE, client.cookie.clone()),
        None => request,
    }
}

/// Target of a redirect response
pub fn location(response: &TestResponse) -> String {
    header_str(response, header::LOCATION)
}

pub fn header_str(response: &TestResponse, name: HeaderName) -> String {
    response
        .header(name)
        .to_str()
        .expect("Header is not ASCII")
        .to_string()
}

/// Where an anonymous visitor to `path` gets sent
pub fn login_url_for(path: &str) -> String {
    format!("/auth/login/?next={}", path)
}
