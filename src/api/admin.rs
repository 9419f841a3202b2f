//! Admin pages
//!
//! Publishing news is the only admin task; the router is mounted behind
//! `require_admin`.

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::common::{context_for_user, form_fields, render};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateNewsInput, FieldErrors};
use crate::services::{validate_news, NewsServiceError};

/// Shown for a date that does not parse as `YYYY-MM-DD`
pub const INVALID_DATE: &str = "Введите правильную дату.";

/// Create admin router
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/news/add/", get(news_form).post(add_news))
}

/// Submitted news fields, echoed back on a failed submission
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NewsForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date: String,
}

impl NewsForm {
    fn parse_date(&self) -> Result<Option<NaiveDate>, FieldErrors> {
        let date = self.date.trim();
        if date.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FieldErrors::single("date", INVALID_DATE))
    }
}

fn render_form(
    state: &AppState,
    user: &AuthenticatedUser,
    form: &NewsForm,
    errors: &FieldErrors,
) -> Result<Html<String>, ApiError> {
    let mut context = context_for_user(&user.0);
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "admin/news_form.html", &context)
}

/// GET /admin/news/add/
async fn news_form(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    render_form(&state, &user, &NewsForm::default(), &FieldErrors::new())
}

/// POST /admin/news/add/
async fn add_news(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    form: Result<Form<NewsForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let form = form_fields(form)?;
    let (date, mut errors) = match form.parse_date() {
        Ok(date) => (date, FieldErrors::new()),
        Err(errors) => (None, errors),
    };

    let input = CreateNewsInput {
        title: form.title.clone(),
        text: form.text.clone(),
        date,
    };

    // Report the other fields alongside a bad date
    if !errors.is_empty() {
        errors.merge(validate_news(&input));
        return Ok(render_form(&state, &user, &form, &errors)?.into_response());
    }

    match state.news_service.create(input).await {
        Ok(news) => {
            tracing::info!(news_id = news.id, admin_id = user.0.id, "News added from admin page");
            Ok(Redirect::to(&format!("/news/{}/", news.id)).into_response())
        }
        Err(NewsServiceError::Validation(errors)) => {
            Ok(render_form(&state, &user, &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
