//! Shared request validation helpers for inbound HTTP adapters.
//!
//! Extractor failures (malformed JSON, unknown fields, bad query strings) are
//! turned into the same validation envelope handlers produce, so clients see
//! one error shape regardless of where a request was rejected.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::debug;

use super::ApiResult;
use crate::domain::user_service::USER_NOT_FOUND;
use crate::domain::validation::FieldViolation;
use crate::domain::{Error, UserId};

/// Message for requests that match no route.
pub const ROUTE_NOT_FOUND: &str = "Route not found";

fn malformed(field: &'static str, code: &'static str, message: String) -> Error {
    Error::validation(vec![FieldViolation::new(field, code, message)])
}

/// Error handler for `web::JsonConfig`.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = req.path(), error = %err, "rejected JSON payload");
    malformed("body", "invalid_json", err.to_string()).into()
}

/// Error handler for `web::QueryConfig`.
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = req.path(), error = %err, "rejected query string");
    malformed("query", "invalid_query", err.to_string()).into()
}

/// JSON extractor configuration used by every route.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Query extractor configuration used by every route.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

/// Default service answering unknown routes.
pub async fn route_not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found(ROUTE_NOT_FOUND))
}

/// Parse a path identifier; a malformed id cannot name a stored user.
pub(crate) fn parse_user_id(raw: String) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found(USER_NOT_FOUND))
}
