//! Note pages
//!
//! Everything except the landing page is behind the login gate, and every
//! note lookup is scoped to the logged-in author.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use crate::api::common::{context_for, context_for_user, form_fields, render};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{FieldErrors, NoteInput};
use crate::services::NoteServiceError;

const SUCCESS_URL: &str = "/notes/done/";

/// Landing page
pub fn public_router() -> Router<AppState> {
    Router::new().route("/notes/", get(home))
}

/// Note management, behind the login gate
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/notes/list/", get(list))
        .route("/notes/add/", get(add_form).post(add))
        .route("/notes/done/", get(done))
        .route("/notes/note/{slug}/", get(detail))
        .route("/notes/edit/{slug}/", get(edit_form).post(edit))
        .route(
            "/notes/delete/{slug}/",
            get(delete_form).post(delete).delete(delete),
        )
}

impl From<NoteServiceError> for ApiError {
    fn from(e: NoteServiceError) -> Self {
        match e {
            NoteServiceError::NotFound => ApiError::not_found("Note not found"),
            other => ApiError::internal_error(other.to_string()),
        }
    }
}

fn render_form(
    state: &AppState,
    user: &AuthenticatedUser,
    form: &NoteInput,
    errors: &FieldErrors,
    is_edit: bool,
) -> Result<Html<String>, ApiError> {
    let mut context = context_for_user(&user.0);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("is_edit", &is_edit);
    render(state, "notes/form.html", &context)
}

/// GET /notes/
async fn home(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
) -> Result<Html<String>, ApiError> {
    render(&state, "notes/home.html", &context_for(user.as_ref()))
}

/// GET /notes/list/ - the author's own notes
async fn list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    let notes = state.note_service.list_for_author(user.0.id).await?;

    let mut context = context_for_user(&user.0);
    context.insert("notes", &notes);
    render(&state, "notes/list.html", &context)
}

/// GET /notes/add/
async fn add_form(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    render_form(&state, &user, &NoteInput::default(), &FieldErrors::new(), false)
}

/// POST /notes/add/
async fn add(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    form: Result<Form<NoteInput>, FormRejection>,
) -> Result<Response, ApiError> {
    let input = form_fields(form)?;
    match state.note_service.create(user.0.id, input.clone()).await {
        Ok(_) => Ok(Redirect::to(SUCCESS_URL).into_response()),
        Err(NoteServiceError::Validation(errors)) => {
            Ok(render_form(&state, &user, &input, &errors, false)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/done/
async fn done(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    render(&state, "notes/success.html", &context_for_user(&user.0))
}

/// GET /notes/note/{slug}/
async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    let note = state.note_service.get_for_author(&slug, user.0.id).await?;

    let mut context = context_for_user(&user.0);
    context.insert("note", &note);
    render(&state, "notes/detail.html", &context)
}

/// GET /notes/edit/{slug}/
async fn edit_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    let note = state.note_service.get_for_author(&slug, user.0.id).await?;
    render_form(&state, &user, &NoteInput::from(&note), &FieldErrors::new(), true)
}

/// POST /notes/edit/{slug}/ - ownership is settled before the body is read
async fn edit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: AuthenticatedUser,
    form: Result<Form<NoteInput>, FormRejection>,
) -> Result<Response, ApiError> {
    state.note_service.get_for_author(&slug, user.0.id).await?;
    let input = form_fields(form)?;

    match state.note_service.update(&slug, user.0.id, input.clone()).await {
        Ok(_) => Ok(Redirect::to(SUCCESS_URL).into_response()),
        Err(NoteServiceError::Validation(errors)) => {
            Ok(render_form(&state, &user, &input, &errors, true)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/delete/{slug}/ - confirmation page
async fn delete_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: AuthenticatedUser,
) -> Result<Html<String>, ApiError> {
    let note = state.note_service.get_for_author(&slug, user.0.id).await?;

    let mut context = context_for_user(&user.0);
    context.insert("note", &note);
    render(&state, "notes/delete.html", &context)
}

/// POST or DELETE /notes/delete/{slug}/
async fn delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: AuthenticatedUser,
) -> Result<Redirect, ApiError> {
    state.note_service.delete(&slug, user.0.id).await?;
    Ok(Redirect::to(SUCCESS_URL))
}
