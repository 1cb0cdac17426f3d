//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Unvalidated input for a new user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub phone: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub phone: Option<String>,
}

impl UserChanges {
    /// Whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none() && self.phone.is_none()
    }
}

/// Domain use-case port for creating, updating and deleting users.
///
/// Validation failures report every offending field in the error details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and store a new user.
    ///
    /// # Errors
    ///
    /// - Invalid request when any field fails validation.
    /// - Conflict when the email is already registered.
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error>;

    /// Apply `changes` to an existing user.
    ///
    /// # Errors
    ///
    /// - Invalid request when no field is supplied or any field is invalid.
    /// - Not found when `id` matches no user.
    /// - Conflict when the new email belongs to another user.
    async fn update_user(&self, id: &UserId, changes: UserChanges) -> Result<User, Error>;

    /// Remove a user and return it as it was before deletion.
    async fn delete_user(&self, id: &UserId) -> Result<User, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UserChanges::default(), true)]
    #[case(UserChanges { age: Some(3), ..UserChanges::default() }, false)]
    #[case(UserChanges { phone: Some(String::new()), ..UserChanges::default() }, false)]
    fn changes_report_emptiness(#[case] changes: UserChanges, #[case] expected: bool) {
        assert_eq!(changes.is_empty(), expected);
    }
}
