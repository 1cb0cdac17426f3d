//! Field-level validation rules for user data.
//!
//! The predicates here are pure: they inspect a candidate value and report
//! whether it satisfies the format constraint. Entity constructors and the
//! user service build [`FieldViolation`] lists from them so a single response
//! can report every invalid field at once.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Smallest accepted age.
pub const AGE_MIN: i64 = 0;
/// Largest accepted age.
pub const AGE_MAX: i64 = 150;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // Length bounds apply after the optional leading `+`.
        Regex::new(r"^\+?[0-9\s\-()]{7,20}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Return `true` when `name` still has content after trimming whitespace.
///
/// # Examples
/// ```
/// use user_registry::domain::validation::is_valid_name;
///
/// assert!(is_valid_name(" Ada "));
/// assert!(!is_valid_name("   "));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Return `true` when `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Return `true` when `phone` contains only digits, spaces, hyphens and
/// parentheses and has 7 to 20 of them after an optional leading `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

/// Return `true` when `age` lies within `[AGE_MIN, AGE_MAX]`.
pub fn is_valid_age(age: i64) -> bool {
    (AGE_MIN..=AGE_MAX).contains(&age)
}

/// One failed validation rule, attributed to a request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    field: &'static str,
    code: &'static str,
    message: String,
}

impl FieldViolation {
    /// Build a violation for `field` with a stable machine-readable `code`.
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }

    /// Name of the offending field as it appears in request bodies.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Stable machine-readable code, e.g. `invalid_email`.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Render violations as the JSON array carried in error `details`.
pub fn violations_to_details(violations: &[FieldViolation]) -> Value {
    serde_json::to_value(violations).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice@example.com", true)]
    #[case("ALICE@X.COM", true)]
    #[case("a@b.c", true)]
    #[case("alice@example", false)]
    #[case("alice example@x.com", false)]
    #[case("@x.com", false)]
    #[case("alice@@x.com", false)]
    #[case("", false)]
    fn email_rule(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(email), expected);
    }

    #[rstest]
    #[case("090-1234-5678", true)]
    #[case("+81 (3) 1234 5678", true)]
    #[case("1234567", true)]
    #[case("123456", false)]
    #[case("123456789012345678901", false)]
    #[case("+12345678901234567890", true)]
    #[case("+123456", false)]
    #[case("phone: 1234567", false)]
    #[case("++1234567", false)]
    fn phone_rule(#[case] phone: &str, #[case] expected: bool) {
        assert_eq!(is_valid_phone(phone), expected);
    }

    #[rstest]
    #[case(0, true)]
    #[case(150, true)]
    #[case(-1, false)]
    #[case(151, false)]
    fn age_rule(#[case] age: i64, #[case] expected: bool) {
        assert_eq!(is_valid_age(age), expected);
    }

    #[rstest]
    fn violations_serialise_as_field_code_message() {
        let details = violations_to_details(&[FieldViolation::new(
            "email",
            "invalid_email",
            "email must be a valid address",
        )]);

        assert_eq!(
            details,
            serde_json::json!([{
                "field": "email",
                "code": "invalid_email",
                "message": "email must be a valid address",
            }])
        );
    }
}
