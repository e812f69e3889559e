//! User records and credential providers
//!
//! The service never mutates users. A provider only answers lookups by
//! username; `StaticCredentials` holds a fixed table, typically loaded from
//! a JSON file at startup:
//!
//! ```json
//! [
//!   {"username": "admin", "full_name": "Admin User",
//!    "password_hash": "$argon2id$v=19$...", "disabled": false}
//! ]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;
use crate::password::verify_password;

/// A known user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub password_hash: String,
    #[serde(default)]
    pub disabled: bool,
}

impl UserRecord {
    pub fn new(
        username: impl Into<String>,
        full_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            full_name: Some(full_name.into()),
            password_hash: password_hash.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Read-only source of user records
pub trait CredentialProvider: Send + Sync {
    fn get_user(&self, username: &str) -> Option<UserRecord>;
}

/// Fixed in-memory user table
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, UserRecord>,
}

impl StaticCredentials {
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }

    /// Load a JSON array of user records
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let users: Vec<UserRecord> =
            serde_json::from_str(json).map_err(|e| AuthError::Credentials(e.to_string()))?;
        Ok(Self::new(users))
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Credentials(format!("{}: {}", path.display(), e)))?;
        let credentials = Self::from_json(&json)?;
        debug!(path = %path.display(), users = credentials.len(), "Loaded credentials");
        Ok(credentials)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialProvider for StaticCredentials {
    fn get_user(&self, username: &str) -> Option<UserRecord> {
        self.users.get(username).cloned()
    }
}

/// Check a username and password against a provider
///
/// Returns the user record on success. Disabled users still authenticate;
/// callers decide whether a disabled account may act.
pub fn authenticate(
    provider: &dyn CredentialProvider,
    username: &str,
    password: &str,
) -> Option<UserRecord> {
    let user = provider.get_user(username)?;
    verify_password(password, &user.password_hash).then_some(user)
}
