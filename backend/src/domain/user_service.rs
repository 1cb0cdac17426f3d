//! User domain service.
//!
//! Implements the [`UsersQuery`] and [`UsersCommand`] driving ports on top of
//! any [`UserRepository`], translating persistence failures into transport
//! agnostic [`Error`] values.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    UserChanges, UserDraft, UserPersistenceError, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::validation::{AGE_MAX, AGE_MIN, FieldViolation, is_valid_age};
use crate::domain::{Error, User, UserId, UserValidationError, UserValidationErrors};

/// Message for identifiers that match no user.
pub const USER_NOT_FOUND: &str = "User not found";

/// User service implementing the read and write driving ports.
#[derive(Clone)]
pub struct UserService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserService<R> {
    /// Create a new service over `repo`, stamping timestamps from `clock`.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                debug!(%message, "user repository connection failed");
                Error::service_unavailable("user storage unavailable")
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateKey { field } if field == "email" => {
                Error::conflict("Email already exists")
            }
            UserPersistenceError::DuplicateKey { .. } => Error::conflict("User already exists"),
        }
    }

    fn invalid(errors: UserValidationErrors) -> Error {
        Error::validation(errors.violations())
    }

    fn age_bound_violation(field: &'static str, value: i64) -> Option<FieldViolation> {
        (!is_valid_age(value)).then(|| {
            FieldViolation::new(
                field,
                "age_out_of_range",
                format!("{field} must be between {AGE_MIN} and {AGE_MAX}"),
            )
        })
    }

    async fn load(&self, id: &UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    /// Apply every supplied change, collecting all violations.
    fn apply_changes(&self, user: &mut User, changes: UserChanges) -> Result<(), Error> {
        let UserChanges {
            name,
            email,
            age,
            phone,
        } = changes;
        let clock = self.clock.as_ref();

        let outcomes: [Option<Result<(), UserValidationError>>; 4] = [
            name.map(|value| user.update_name(value, clock)),
            email.map(|value| user.update_email(value, clock)),
            age.map(|value| user.update_age(Some(value), clock)),
            phone.map(|value| user.update_phone(Some(value), clock)),
        ];
        let errors: Vec<UserValidationError> = outcomes
            .into_iter()
            .flatten()
            .filter_map(Result::err)
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::invalid(UserValidationErrors::new(errors)))
        }
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repo
            .find_all()
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        self.load(id).await
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<User>, Error> {
        self.repo
            .find_by_name(fragment)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn find_by_age_range(&self, min: i64, max: i64) -> Result<Vec<User>, Error> {
        let violations: Vec<FieldViolation> = [
            Self::age_bound_violation("minAge", min),
            Self::age_bound_violation("maxAge", max),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !violations.is_empty() {
            return Err(Error::validation(violations));
        }
        if min > max {
            return Ok(Vec::new());
        }

        let (Ok(min), Ok(max)) = (u8::try_from(min), u8::try_from(max)) else {
            return Err(Error::internal("validated age bounds exceed u8"));
        };
        self.repo
            .find_by_age_range(min, max)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn count_users(&self) -> Result<u64, Error> {
        self.repo.count().await.map_err(Self::map_persistence_error)
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error> {
        let UserDraft {
            name,
            email,
            age,
            phone,
        } = draft;
        let user =
            User::create(name, email, age, phone, self.clock.as_ref()).map_err(Self::invalid)?;

        self.repo
            .save(&user)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn update_user(&self, id: &UserId, changes: UserChanges) -> Result<User, Error> {
        if changes.is_empty() {
            return Err(Error::validation(vec![FieldViolation::new(
                "body",
                "empty_update",
                "at least one field must be provided",
            )]));
        }

        let mut user = self.load(id).await?;
        self.apply_changes(&mut user, changes)?;

        self.repo
            .update(id, &user)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }

    async fn delete_user(&self, id: &UserId) -> Result<User, Error> {
        self.repo
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
