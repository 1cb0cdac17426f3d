//! Driving port for user reads.
//!
//! Inbound adapters (HTTP handlers) use this port to fetch users without
//! importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every user, newest first.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// A single user, or a not-found error.
    async fn get_user(&self, id: &UserId) -> Result<User, Error>;

    /// Users whose name contains `fragment`, newest first.
    async fn find_by_name(&self, fragment: &str) -> Result<Vec<User>, Error>;

    /// Users aged within `[min, max]`, youngest first.
    ///
    /// Bounds outside the accepted age range fail validation; `min > max`
    /// yields an empty list.
    async fn find_by_age_range(&self, min: i64, max: i64) -> Result<Vec<User>, Error>;

    /// Number of stored users.
    async fn count_users(&self) -> Result<u64, Error>;
}
