//! Tests for domain errors.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.details().is_none());
}

#[rstest]
fn validation_error_lists_every_violation() {
    let err = Error::validation(vec![
        FieldViolation::new("name", "empty_name", "name must not be empty"),
        FieldViolation::new("email", "invalid_email", "email must be a valid address"),
    ]);

    assert_eq!(err.message(), "Validation error");
    assert_eq!(
        err.details(),
        Some(&json!([
            {"field": "name", "code": "empty_name", "message": "name must not be empty"},
            {"field": "email", "code": "invalid_email", "message": "email must be a valid address"},
        ]))
    );
}

#[rstest]
fn display_uses_message() {
    assert_eq!(Error::conflict("Email already exists").to_string(), "Email already exists");
}
