//! Port abstraction for user persistence adapters and their errors.
//!
//! Adapters hand out detached [`User`] values rebuilt from stored rows; the
//! domain never holds references into storage-internal state.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Email, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// A unique column (`id` or `email`) already holds the value.
    #[error("user with this {field} already exists")]
    DuplicateKey { field: String },
}

impl UserPersistenceError {
    /// Helper for connectivity failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for statement failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-key clashes.
    pub fn duplicate_key(field: impl Into<String>) -> Self {
        Self::DuplicateKey {
            field: field.into(),
        }
    }
}

/// Storage contract for users.
///
/// Absence is reported as `Ok(None)`, never as an error. Each call is atomic
/// only with respect to the single row it touches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every stored user, newest first.
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Users whose name contains `fragment` (case-sensitive), newest first.
    async fn find_by_name(&self, fragment: &str) -> Result<Vec<User>, UserPersistenceError>;

    /// Users aged within `[min, max]`, youngest first.
    async fn find_by_age_range(&self, min: u8, max: u8) -> Result<Vec<User>, UserPersistenceError>;

    /// Insert a new user.
    ///
    /// Fails with [`UserPersistenceError::DuplicateKey`] when the id or email
    /// is already taken.
    async fn save(&self, user: &User) -> Result<User, UserPersistenceError>;

    /// Overwrite the mutable fields of the user stored under `id`.
    ///
    /// `id` and `created_at` are never rewritten. Returns `Ok(None)` when no
    /// user matches.
    async fn update(&self, id: &UserId, user: &User) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user, returning the record as it was before deletion.
    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Number of stored users.
    async fn count(&self) -> Result<u64, UserPersistenceError>;
}
