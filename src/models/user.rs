//! User model
//!
//! Accounts that own comments and notes. Password hashes are argon2 PHC
//! strings and never leave the process in serialized form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted username
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed, see `services::password::hash_password()`.
    pub fn new(username: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the user wrote the object owned by `author_id`.
    ///
    /// Admins get no bypass here: comments and notes are author-only.
    pub fn is_author_of(&self, author_id: i64) -> bool {
        self.id == author_id
    }
}

/// User role.
///
/// - Admin: may publish news
/// - User: may comment and keep notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::User => write!(f, "user"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("reader".to_string(), "hashed".to_string(), UserRole::User);

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "reader");
        assert_eq!(user.role, UserRole::User);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_is_author_of_ignores_role() {
        let mut admin = User::new("admin".to_string(), "hash".to_string(), UserRole::Admin);
        admin.id = 1;
        let mut author = User::new("author".to_string(), "hash".to_string(), UserRole::User);
        author.id = 2;

        assert!(admin.is_author_of(1));
        assert!(!admin.is_author_of(2));
        assert!(author.is_author_of(2));
        assert!(!author.is_author_of(1));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("reader".to_string(), "secret-hash".to_string(), UserRole::User);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("User").unwrap(), UserRole::User);
        assert!(UserRole::from_str("editor").is_err());
    }

    #[test]
    fn test_user_role_display_roundtrip() {
        for role in [UserRole::Admin, UserRole::User] {
            assert_eq!(UserRole::from_str(&role.to_string()).unwrap(), role);
        }
        assert_eq!(UserRole::default(), UserRole::User);
    }
}
