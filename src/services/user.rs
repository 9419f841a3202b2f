//! User service
//!
//! Implements business logic for accounts shared by both sites:
//! - Sign-up (first user becomes admin)
//! - Login/logout
//! - Session validation and expiry

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{FieldErrors, Session, User, UserRole, USERNAME_MAX_LENGTH};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Shown for any failed login, without saying which part was wrong
pub const INVALID_CREDENTIALS: &str =
    "Пожалуйста, введите правильные имя пользователя и пароль.";

/// Shown when sign-up passwords differ
pub const PASSWORD_MISMATCH: &str = "Введённые пароли не совпадают.";

/// Shown when the username is taken
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Per-field validation failures
    #[error("Validation error: {0}")]
    ValidationError(FieldErrors),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_expiration(user_repo, session_repo, DEFAULT_SESSION_EXPIRATION_DAYS)
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new user
    ///
    /// The first user in the system becomes an admin; everyone after that
    /// is a regular user.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for blank fields, an over-long username or
    ///   mismatched passwords
    /// - `UserExists` if the username is taken
    /// - `InternalError` for database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        validate_register_input(&input).map_err(UserServiceError::ValidationError)?;

        let username = input.username.trim().to_string();

        if self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(username));
        }

        let role = if self.is_first_user().await? {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let created = self
            .user_repo
            .create(&User::new(username, password_hash, role))
            .await
            .context("Failed to create user")?;

        tracing::info!(user_id = created.id, role = %created.role, "User registered");

        Ok(created)
    }

    /// Login with credentials
    ///
    /// Returns a fresh session on success.
    ///
    /// # Errors
    ///
    /// - `AuthenticationError` if the username is unknown or the password
    ///   does not match
    /// - `InternalError` for database errors
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(input.username.trim())
            .await
            .context("Failed to get user by username")?
            .ok_or_else(|| UserServiceError::AuthenticationError(INVALID_CREDENTIALS.to_string()))?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(UserServiceError::AuthenticationError(
                INVALID_CREDENTIALS.to_string(),
            ));
        }

        self.start_session(user.id).await
    }

    /// Logout (invalidate session)
    ///
    /// Unknown tokens are not an error.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Validate session token and return the associated user
    ///
    /// Returns `None` if the session does not exist or has expired. Expired
    /// sessions are deleted on sight.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// Start a session for an already-authenticated user
    pub async fn start_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let session = Session::start(user_id, Duration::days(self.session_expiration_days));

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }

    /// `true` if no users exist yet
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;

        Ok(count == 0)
    }

    /// Delete all expired sessions
    ///
    /// Maintenance operation, run periodically from `main`.
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }
}

fn validate_register_input(input: &RegisterInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if !errors.require("username", &input.username) {
        errors.max_length("username", input.username.trim(), USERNAME_MAX_LENGTH);
    }

    let missing_password = errors.require("password1", &input.password);
    let missing_confirmation = errors.require("password2", &input.password_confirmation);

    if !missing_password && !missing_confirmation && input.password != input.password_confirmation {
        errors.add("password2", PASSWORD_MISMATCH);
    }

    errors.into_result()
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
}

impl RegisterInput {
    /// Registration input with the password confirmed
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            password_confirmation: password.clone(),
            password,
        }
    }

    /// Override the confirmation, as typed into the second password field
    pub fn confirmed_with(mut self, confirmation: impl Into<String>) -> Self {
        self.password_confirmation = confirmation.into();
        self
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
