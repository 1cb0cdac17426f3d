//! Uniform JSON response envelope.
//!
//! Every response body has the shape
//! `{success, data?, message?, error?, details?}`; absent members are omitted.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Response body wrapper shared by success and failure responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl<T: Serialize> Envelope<T> {
    /// Successful payload with a human-readable message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
            details: None,
        }
    }

    /// Render with the given status code.
    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

impl Envelope<()> {
    /// Failure payload; `details` carries field violations when present.
    pub fn failure(error: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
            details,
        }
    }
}

/// `200 OK` with a success envelope.
pub fn ok<T: Serialize>(data: T, message: &str) -> HttpResponse {
    Envelope::success(data, message).respond(StatusCode::OK)
}

/// `201 Created` with a success envelope.
pub fn created<T: Serialize>(data: T, message: &str) -> HttpResponse {
    Envelope::success(data, message).respond(StatusCode::CREATED)
}
