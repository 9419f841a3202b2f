//! HTTP layer - page handlers and routing
//!
//! - News pages and comment management
//! - Admin news publishing
//! - Personal notes
//! - Login, logout and sign-up

pub mod admin;
pub mod common;
pub mod middleware;
pub mod news;
pub mod notes;
pub mod users;

use axum::{middleware as axum_middleware, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::repositories::{
    SqlxCommentRepository, SqlxNewsRepository, SqlxNoteRepository, SqlxSessionRepository,
    SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{CommentService, NewsService, NoteService, UserService};
use crate::templates::TemplateEngine;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Wire repositories, services and templates over a migrated pool
pub fn build_state(pool: DynDatabasePool, config: &Config) -> anyhow::Result<AppState> {
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let news_repo = SqlxNewsRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());
    let note_repo = SqlxNoteRepository::boxed(pool.clone());

    let user_service = Arc::new(UserService::with_session_expiration(
        user_repo,
        session_repo,
        config.auth.session_expiration_days,
    ));
    let news_service = Arc::new(NewsService::with_home_count(
        news_repo.clone(),
        config.news.count_on_home_page as usize,
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo, news_repo));
    let note_service = Arc::new(NoteService::new(note_repo));

    let templates = Arc::new(TemplateEngine::new(config.templates.path.as_deref())?);

    Ok(AppState {
        pool,
        user_service,
        news_service,
        comment_service,
        note_service,
        templates,
    })
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    // Admin routes (need admin role)
    let admin_routes =
        admin::router().route_layer(axum_middleware::from_fn(middleware::require_admin));

    // Protected routes (need a logged-in user)
    let protected_routes = Router::new()
        .merge(news::protected_router())
        .merge(notes::protected_router())
        .route_layer(axum_middleware::from_fn(middleware::require_login));

    Router::new()
        .merge(news::public_router())
        .merge(notes::public_router())
        .merge(users::router())
        .merge(admin_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
