//! Account pages
//!
//! Handles:
//! - GET/POST /auth/login/ - login form, sets the session cookie
//! - GET/POST /auth/logout/ - ends the session
//! - GET/POST /auth/signup/ - registration

use axum::{
    extract::{Query, Request, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::api::common::{context_for, render, safe_next};
use crate::api::middleware::{
    clear_session_cookie, extract_session_token, session_cookie, ApiError, AppState,
    AuthenticatedUser, LOGIN_URL,
};
use crate::models::FieldErrors;
use crate::services::user::{INVALID_CREDENTIALS, USERNAME_TAKEN};
use crate::services::{LoginInput, RegisterInput, UserServiceError};

/// Create account router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", get(logout).post(logout))
        .route("/auth/signup/", get(signup_form).post(signup))
}

/// Query string of the login page
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Body of the login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Body of the sign-up form
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        ApiError::internal_error(e.to_string())
    }
}

fn render_login(
    state: &AppState,
    user: Option<&AuthenticatedUser>,
    username: &str,
    next: Option<&str>,
    errors: &FieldErrors,
) -> Result<Html<String>, ApiError> {
    let mut context = context_for(user);
    context.insert("username", username);
    context.insert("next", safe_next(next).unwrap_or_default());
    context.insert("errors", errors);
    render(state, "users/login.html", &context)
}

/// GET /auth/login/
async fn login_form(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, ApiError> {
    render_login(&state, user.as_ref(), "", query.next.as_deref(), &FieldErrors::new())
}

/// POST /auth/login/
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let mut errors = FieldErrors::new();
    errors.require("username", &form.username);
    errors.require("password", &form.password);
    if !errors.is_empty() {
        let page = render_login(&state, None, &form.username, form.next.as_deref(), &errors)?;
        return Ok(page.into_response());
    }

    let session = match state
        .user_service
        .login(LoginInput::new(&form.username, &form.password))
        .await
    {
        Ok(session) => session,
        Err(UserServiceError::AuthenticationError(_)) => {
            tracing::info!(username = %form.username, "Login failed");
            let errors = FieldErrors::single("__all__", INVALID_CREDENTIALS);
            let page = render_login(&state, None, &form.username, form.next.as_deref(), &errors)?;
            return Ok(page.into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let target = safe_next(form.next.as_deref()).unwrap_or("/");
    tracing::debug!(user_id = session.user_id, "Logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(&session))],
        Redirect::to(target),
    )
        .into_response())
}

/// GET or POST /auth/logout/
async fn logout(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    if let Some(token) = extract_session_token(&request) {
        state.user_service.logout(&token).await?;
    }

    let page = render(&state, "users/logout.html", &context_for(None))?;
    Ok(([(header::SET_COOKIE, clear_session_cookie())], page).into_response())
}

fn render_signup(
    state: &AppState,
    username: &str,
    errors: &FieldErrors,
) -> Result<Html<String>, ApiError> {
    let mut context = context_for(None);
    context.insert("username", username);
    context.insert("errors", errors);
    render(state, "users/signup.html", &context)
}

/// GET /auth/signup/
async fn signup_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render_signup(&state, "", &FieldErrors::new())
}

/// POST /auth/signup/
async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, ApiError> {
    let input = RegisterInput::new(&form.username, &form.password1).confirmed_with(&form.password2);

    let errors = match state.user_service.register(input).await {
        Ok(_) => return Ok(Redirect::to(LOGIN_URL).into_response()),
        Err(UserServiceError::ValidationError(errors)) => errors,
        Err(UserServiceError::UserExists(_)) => FieldErrors::single("username", USERNAME_TAKEN),
        Err(e) => return Err(e.into()),
    };

    Ok(render_signup(&state, &form.username, &errors)?.into_response())
}
