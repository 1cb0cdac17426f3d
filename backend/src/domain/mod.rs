//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed user entity, its validation rules and
//! the use-case service the HTTP adapter drives. Nothing here knows about
//! actix or Diesel.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable failure category.
//! - User (alias to `user::User`): validated user aggregate.
//! - UserService: implementation of the `UsersQuery`/`UsersCommand` ports.

pub mod error;
pub mod ports;
pub mod user;
pub mod user_service;
pub mod validation;

pub use self::error::{Error, ErrorCode};
pub use self::user::{
    Age, Email, Phone, User, UserId, UserName, UserRecord, UserValidationError,
    UserValidationErrors,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use user_registry::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("User not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
