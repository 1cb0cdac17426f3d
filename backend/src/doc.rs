//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler mounted by
//!   [`api_scope`](crate::inbound::http::api_scope)
//! - **Schemas**: request bodies, payloads, and the success and error
//!   envelopes documented through the doc-only wrappers in
//!   [`schemas`](crate::inbound::http::schemas)
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::health::{DetailedHealthReport, HealthReport};
use crate::inbound::http::schemas::{
    DatabaseStatsEnvelopeSchema, DetailedHealthEnvelopeSchema, ErrorEnvelopeSchema,
    FieldViolationSchema, HealthEnvelopeSchema, UserEnvelopeSchema, UserListEnvelopeSchema,
    UserSchema,
};
use crate::inbound::http::users::{CreateUserRequest, DatabaseStats, UpdateUserRequest};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User registry API",
        description = "CRUD access to user records and service health probes.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::inbound::http::health::health,
        crate::inbound::http::health::health_detailed,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::search_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::database_stats,
    ),
    components(schemas(
        UserSchema,
        FieldViolationSchema,
        ErrorEnvelopeSchema,
        UserEnvelopeSchema,
        UserListEnvelopeSchema,
        HealthEnvelopeSchema,
        DetailedHealthEnvelopeSchema,
        DatabaseStatsEnvelopeSchema,
        CreateUserRequest,
        UpdateUserRequest,
        DatabaseStats,
        HealthReport,
        DetailedHealthReport,
    )),
    tags(
        (name = "users", description = "Operations related to users"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/health")]
    #[case("/api/health/detailed")]
    #[case("/api/users")]
    #[case("/api/users/search")]
    #[case("/api/users/{id}")]
    #[case("/api/database/stats")]
    fn openapi_registers_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn user_item_path_has_read_update_and_delete() {
        let doc = ApiDoc::openapi();
        let item = doc.paths.paths.get("/api/users/{id}").expect("item path");

        assert!(item.get.is_some());
        assert!(item.put.is_some());
        assert!(item.delete.is_some());
    }

    #[rstest]
    #[case("User", &["id", "name", "email", "age", "phone", "createdAt", "updatedAt"])]
    #[case("ErrorEnvelope", &["success", "error", "details"])]
    #[case("FieldViolation", &["field", "code", "message"])]
    fn openapi_schema_has_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");

        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }
}
