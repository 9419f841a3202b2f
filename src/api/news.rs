//! News pages
//!
//! - GET  / - latest news
//! - GET  /news/{id}/ - news item with its comments
//! - POST /news/{id}/ - add a comment (login)
//! - GET/POST /edit_comment/{id}/ - edit own comment
//! - GET/POST /delete_comment/{id}/ - delete own comment

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use crate::api::common::{
    context_for, context_for_user, form_fields, render, CommentForm, ObjectId,
};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Comment, FieldErrors};
use crate::services::{CommentServiceError, NewsServiceError};

/// Pages anyone can open
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/news/{id}/", get(detail).post(add_comment))
}

/// Comment management, behind the login gate
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/edit_comment/{id}/", get(edit_comment_form).post(edit_comment))
        .route("/delete_comment/{id}/", get(delete_comment_form).post(delete_comment))
}

impl From<NewsServiceError> for ApiError {
    fn from(e: NewsServiceError) -> Self {
        match e {
            NewsServiceError::NotFound(id) => ApiError::not_found(format!("News {} not found", id)),
            other => ApiError::internal_error(other.to_string()),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::NotFound => ApiError::not_found("Comment not found"),
            other => ApiError::internal_error(other.to_string()),
        }
    }
}

fn comments_anchor(news_id: i64) -> String {
    format!("/news/{}/#comments", news_id)
}

/// GET / - latest news
async fn home(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
) -> Result<Html<String>, ApiError> {
    let news_list = state.news_service.home().await?;

    let mut context = context_for(user.as_ref());
    context.insert("news_list", &news_list);
    render(&state, "news/home.html", &context)
}

/// GET /news/{id}/ - news item with comments
async fn detail(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
    user: Option<AuthenticatedUser>,
) -> Result<Html<String>, ApiError> {
    render_detail(&state, id, user.as_ref(), "", &FieldErrors::new()).await
}

async fn render_detail(
    state: &AppState,
    news_id: i64,
    user: Option<&AuthenticatedUser>,
    form_text: &str,
    errors: &FieldErrors,
) -> Result<Html<String>, ApiError> {
    let news = state.news_service.get(news_id).await?;
    let comments = state.comment_service.list_for_news(news_id).await?;

    let mut context = context_for(user);
    context.insert("news", &news);
    context.insert("comments", &comments);
    context.insert("form_text", form_text);
    context.insert("errors", errors);
    render(state, "news/detail.html", &context)
}

/// POST /news/{id}/ - add a comment
async fn add_comment(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
    user: AuthenticatedUser,
    form: Result<Form<CommentForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let form = form_fields(form)?;
    match state.comment_service.create(id, user.0.id, &form.text).await {
        Ok(_) => Ok(Redirect::to(&comments_anchor(id)).into_response()),
        Err(CommentServiceError::Validation(errors)) => {
            let page = render_detail(&state, id, Some(&user), &form.text, &errors).await?;
            Ok(page.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_comment_page(
    state: &AppState,
    template: &str,
    user: &AuthenticatedUser,
    comment: &Comment,
    form_text: &str,
    errors: &FieldErrors,
) -> Result<Html<String>, ApiError> {
    let news = state.news_service.get(comment.news_id).await?;

    let mut context = context_for_user(&user.0);
    context.insert("comment", comment);
    context.insert("news", &news);
    context.insert("form_text", form_text);
    context.insert("errors", errors);
    render(state, template, &context)
}

/// GET /edit_comment/{id}/
async fn edit_comment_form(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    let comment = state.comment_service.get_for_author(id, user.0.id).await?;
    render_comment_page(
        &state,
        "news/comment_edit.html",
        &user,
        &comment,
        &comment.text,
        &FieldErrors::new(),
    )
    .await
}

/// POST /edit_comment/{id}/
///
/// The comment is looked up before the body is read, so a foreign comment is
/// a 404 whatever was posted.
async fn edit_comment(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
    user: AuthenticatedUser,
    form: Result<Form<CommentForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let comment = state.comment_service.get_for_author(id, user.0.id).await?;
    let form = form_fields(form)?;

    match state.comment_service.update(id, user.0.id, &form.text).await {
        Ok(comment) => Ok(Redirect::to(&comments_anchor(comment.news_id)).into_response()),
        Err(CommentServiceError::Validation(errors)) => {
            let page = render_comment_page(
                &state,
                "news/comment_edit.html",
                &user,
                &comment,
                &form.text,
                &errors,
            )
            .await?;
            Ok(page.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /delete_comment/{id}/ - confirmation page
async fn delete_comment_form(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    let comment = state.comment_service.get_for_author(id, user.0.id).await?;
    render_comment_page(
        &state,
        "news/comment_delete.html",
        &user,
        &comment,
        "",
        &FieldErrors::new(),
    )
    .await
}

/// POST /delete_comment/{id}/
async fn delete_comment(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
    user: AuthenticatedUser,
) -> Result<Redirect, ApiError> {
    let comment = state.comment_service.delete(id, user.0.id).await?;
    tracing::debug!(comment_id = id, news_id = comment.news_id, "Comment deleted");

    Ok(Redirect::to(&comments_anchor(comment.news_id)))
}
