//! Common page utilities and shared form types

use axum::{
    extract::{rejection::FormRejection, FromRequestParts, Path},
    http::request::Parts,
    response::Html,
    Form,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::User;
use crate::templates::page_context;

/// Body of the comment create and edit forms
#[derive(Debug, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// Numeric object id from the path. Anything that is not a number is a
/// missing page, like an id that matches nothing.
#[derive(Debug, Clone, Copy)]
pub struct ObjectId(pub i64);

impl<S> FromRequestParts<S> for ObjectId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::not_found(e.body_text()))?;
        Ok(ObjectId(id))
    }
}

/// Submitted form fields. A POST without a form body counts as a form with
/// every field left empty.
pub fn form_fields<T: Default>(form: Result<Form<T>, FormRejection>) -> Result<T, ApiError> {
    match form {
        Ok(Form(fields)) => Ok(fields),
        Err(FormRejection::InvalidFormContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

/// Render a page, turning template failures into a 500
pub fn render(state: &AppState, template: &str, context: &TeraContext) -> Result<Html<String>, ApiError> {
    state
        .templates
        .render(template, context)
        .map(Html)
        .map_err(|e| ApiError::internal_error(format!("{:#}", e)))
}

/// Starting context for a page seen by `user`
pub fn context_for(user: Option<&AuthenticatedUser>) -> TeraContext {
    page_context(user.map(|u| &u.0))
}

/// Starting context for a page behind the login gate
pub fn context_for_user(user: &User) -> TeraContext {
    page_context(Some(user))
}

/// Only same-site paths are followed after login
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_accepts_local_paths() {
        assert_eq!(safe_next(Some("/notes/list/")), Some("/notes/list/"));
        assert_eq!(safe_next(Some("/")), Some("/"));
    }

    #[test]
    fn test_safe_next_rejects_other_hosts() {
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("//evil.example/")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("")), None);
        assert_eq!(safe_next(None), None);
    }
}
