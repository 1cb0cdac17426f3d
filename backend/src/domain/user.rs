//! User entity and its validated field types.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::validation::{
    AGE_MAX, AGE_MIN, FieldViolation, is_valid_age, is_valid_email, is_valid_name, is_valid_phone,
};

/// Validation errors raised by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    InvalidEmail,
    AgeOutOfRange { age: i64 },
    InvalidPhone,
}

impl UserValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyName => "name",
            Self::InvalidEmail => "email",
            Self::AgeOutOfRange { .. } => "age",
            Self::InvalidPhone => "phone",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId => "empty_id",
            Self::InvalidId => "invalid_id",
            Self::EmptyName => "empty_name",
            Self::InvalidEmail => "invalid_email",
            Self::AgeOutOfRange { .. } => "age_out_of_range",
            Self::InvalidPhone => "invalid_phone",
        }
    }

    /// Convert into the field violation reported to clients.
    pub fn to_violation(&self) -> FieldViolation {
        FieldViolation::new(self.field(), self.code(), self.to_string())
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::AgeOutOfRange { .. } => {
                write!(f, "age must be between {AGE_MIN} and {AGE_MAX}")
            }
            Self::InvalidPhone => write!(
                f,
                "phone may only contain digits, spaces, hyphens, parentheses and a leading +, 7 to 20 characters",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Every violation found while validating a whole user at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserValidationErrors(Vec<UserValidationError>);

impl UserValidationErrors {
    /// Wrap a list of violations.
    pub fn new(errors: Vec<UserValidationError>) -> Self {
        Self(errors)
    }

    /// Individual failures in field order.
    pub fn errors(&self) -> &[UserValidationError] {
        &self.0
    }

    /// Failures rendered as client-facing violations.
    pub fn violations(&self) -> Vec<FieldViolation> {
        self.0.iter().map(UserValidationError::to_violation).collect()
    }
}

impl From<UserValidationError> for UserValidationErrors {
    fn from(value: UserValidationError) -> Self {
        Self(vec![value])
    }
}

impl fmt::Display for UserValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for UserValidationErrors {}

/// Opaque user identifier.
///
/// New users receive a UUID v4 string; identifiers read back from storage
/// are accepted as-is provided they are non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Person name, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Trim and validate a name.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self(name.trim().to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Email address normalised to lowercase.
///
/// # Examples
/// ```
/// use user_registry::domain::Email;
///
/// let email = Email::new("ALICE@X.com").expect("valid email");
/// assert_eq!(email.as_ref(), "alice@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate an address and normalise it to lowercase.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if !is_valid_email(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email.to_lowercase()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Age in whole years, within `[0, 150]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Age(u8);

impl Age {
    /// Validate an age.
    pub fn new(age: i64) -> Result<Self, UserValidationError> {
        if !is_valid_age(age) {
            return Err(UserValidationError::AgeOutOfRange { age });
        }
        u8::try_from(age)
            .map(Self)
            .map_err(|_| UserValidationError::AgeOutOfRange { age })
    }

    /// Numeric value.
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Contact phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone(String);

impl Phone {
    /// Validate a freshly supplied phone number.
    pub fn new(phone: impl Into<String>) -> Result<Self, UserValidationError> {
        let phone = phone.into();
        if !is_valid_phone(&phone) {
            return Err(UserValidationError::InvalidPhone);
        }
        Ok(Self(phone))
    }

    /// Accept a stored value without enforcing the format.
    fn legacy(phone: String) -> Self {
        Self(phone)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Treat blank phone input as absent.
fn non_blank(phone: Option<String>) -> Option<String> {
    phone.filter(|value| !value.trim().is_empty())
}

/// Timestamps keep microsecond precision so they survive storage unchanged.
fn now(clock: &dyn Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(6)
}

/// Plain data snapshot of a [`User`], used for persistence and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application user.
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
/// - `email` matches the email rule and is lowercase.
/// - `age`, when present, lies within `[0, 150]`.
/// - `created_at` never changes; `updated_at` moves on every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: Email,
    age: Option<Age>,
    phone: Option<Phone>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh identifier.
    ///
    /// All fields are validated and every failure is reported, not just the
    /// first. Both timestamps are set to the same instant.
    ///
    /// # Examples
    /// ```
    /// use mockable::DefaultClock;
    /// use user_registry::domain::User;
    ///
    /// let user = User::create("Alice", "ALICE@x.com", Some(30), None, &DefaultClock)
    ///     .expect("valid user");
    /// assert_eq!(user.email().as_ref(), "alice@x.com");
    /// assert_eq!(user.created_at(), user.updated_at());
    /// ```
    pub fn create(
        name: impl Into<String>,
        email: impl Into<String>,
        age: Option<i64>,
        phone: Option<String>,
        clock: &dyn Clock,
    ) -> Result<Self, UserValidationErrors> {
        let name = UserName::new(name);
        let email = Email::new(email);
        let age = age.map(Age::new).transpose();
        let phone = non_blank(phone).map(Phone::new).transpose();

        match (name, email, age, phone) {
            (Ok(name), Ok(email), Ok(age), Ok(phone)) => {
                let timestamp = now(clock);
                Ok(Self {
                    id: UserId::random(),
                    name,
                    email,
                    age,
                    phone,
                    created_at: timestamp,
                    updated_at: timestamp,
                })
            }
            (name, email, age, phone) => Err(UserValidationErrors::new(
                [name.err(), email.err(), age.err(), phone.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }

    /// Rebuild a user from a persisted snapshot.
    ///
    /// Identifier, name, email and age invariants are enforced. A stored phone
    /// number that no longer matches the phone rule is kept and logged, since
    /// older records were written before the rule existed.
    pub fn from_record(record: UserRecord) -> Result<Self, UserValidationErrors> {
        let UserRecord {
            id,
            name,
            email,
            age,
            phone,
            created_at,
            updated_at,
        } = record;

        let id = UserId::new(id);
        let name = UserName::new(name);
        let email = Email::new(email);
        let age = age.map(|value| Age::new(i64::from(value))).transpose();

        match (id, name, email, age) {
            (Ok(id), Ok(name), Ok(email), Ok(age)) => {
                let phone = non_blank(phone).map(|raw| match Phone::new(raw.clone()) {
                    Ok(phone) => phone,
                    Err(_) => {
                        warn!(user_id = %id, phone = %raw, "invalid phone format on stored user");
                        Phone::legacy(raw)
                    }
                });
                Ok(Self {
                    id,
                    name,
                    email,
                    age,
                    phone,
                    created_at,
                    updated_at,
                })
            }
            (id, name, email, age) => Err(UserValidationErrors::new(
                [id.err(), name.err(), email.err(), age.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }

    /// Replace the name.
    pub fn update_name(
        &mut self,
        name: impl Into<String>,
        clock: &dyn Clock,
    ) -> Result<(), UserValidationError> {
        self.name = UserName::new(name)?;
        self.touch(clock);
        Ok(())
    }

    /// Replace the email address.
    pub fn update_email(
        &mut self,
        email: impl Into<String>,
        clock: &dyn Clock,
    ) -> Result<(), UserValidationError> {
        self.email = Email::new(email)?;
        self.touch(clock);
        Ok(())
    }

    /// Replace or clear the age.
    pub fn update_age(&mut self, age: Option<i64>, clock: &dyn Clock) -> Result<(), UserValidationError> {
        self.age = age.map(Age::new).transpose()?;
        self.touch(clock);
        Ok(())
    }

    /// Replace or clear the phone number. Blank input clears it.
    pub fn update_phone(
        &mut self,
        phone: Option<String>,
        clock: &dyn Clock,
    ) -> Result<(), UserValidationError> {
        self.phone = non_blank(phone).map(Phone::new).transpose()?;
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = now(clock);
    }

    /// Produce a plain data snapshot.
    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id.to_string(),
            name: self.name.as_ref().to_owned(),
            email: self.email.as_ref().to_owned(),
            age: self.age.map(Age::value),
            phone: self.phone.as_ref().map(|phone| phone.as_ref().to_owned()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn age(&self) -> Option<Age> {
        self.age
    }

    pub fn phone(&self) -> Option<&Phone> {
        self.phone.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
