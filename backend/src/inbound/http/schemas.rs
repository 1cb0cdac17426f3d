//! OpenAPI schema definitions for domain types and response envelopes.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration. The wrappers mirror the JSON
//! the handlers emit but are never constructed.

use utoipa::ToSchema;

use super::health::{DetailedHealthReport, HealthReport};
use super::users::DatabaseStats;

/// OpenAPI schema for [`crate::domain::UserRecord`].
#[derive(ToSchema)]
#[schema(as = User, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Opaque user identifier; UUID v4 for new users.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Trimmed display name.
    #[schema(example = "Ada Lovelace")]
    name: String,
    /// Lowercase email address, unique across users.
    #[schema(example = "ada@example.com")]
    email: String,
    /// Age in years; omitted when unknown.
    #[schema(minimum = 0, maximum = 150)]
    age: Option<u8>,
    /// Contact number; omitted when unknown.
    #[schema(example = "+44 20 7946 0000")]
    phone: Option<String>,
    /// Creation time, RFC 3339.
    #[schema(format = DateTime)]
    created_at: String,
    /// Last modification time, RFC 3339.
    #[schema(format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::validation::FieldViolation`].
#[derive(ToSchema)]
#[schema(as = FieldViolation)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldViolationSchema {
    #[schema(example = "email")]
    field: String,
    #[schema(example = "invalid_email")]
    code: String,
    #[schema(example = "email must be a valid address")]
    message: String,
}

/// Failure envelope returned by every non-2xx response.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorEnvelopeSchema {
    /// Always `false`.
    success: bool,
    /// Human-readable summary, e.g. `User not found`.
    #[schema(example = "Validation error")]
    error: String,
    /// Field violations for validation failures.
    details: Option<Vec<FieldViolationSchema>>,
}

macro_rules! success_envelope {
    ($name:ident, $alias:ident, $data:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(ToSchema)]
        #[schema(as = $alias)]
        #[expect(
            dead_code,
            reason = "Used only for OpenAPI schema generation via utoipa"
        )]
        pub struct $name {
            /// Always `true`.
            success: bool,
            data: $data,
            message: String,
        }
    };
}

success_envelope!(UserEnvelopeSchema, UserEnvelope, UserSchema, "Envelope holding one user.");
success_envelope!(
    UserListEnvelopeSchema,
    UserListEnvelope,
    Vec<UserSchema>,
    "Envelope holding a list of users."
);
success_envelope!(
    HealthEnvelopeSchema,
    HealthEnvelope,
    HealthReport,
    "Envelope holding the basic health report."
);
success_envelope!(
    DetailedHealthEnvelopeSchema,
    DetailedHealthEnvelope,
    DetailedHealthReport,
    "Envelope holding the detailed health report."
);
success_envelope!(
    DatabaseStatsEnvelopeSchema,
    DatabaseStatsEnvelope,
    DatabaseStats,
    "Envelope holding storage statistics."
);
