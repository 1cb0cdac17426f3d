//! Health endpoints reporting liveness, uptime and build details.
//! Documented in OpenAPI via Utoipa.

use std::sync::Arc;
use std::time::Instant;

use actix_web::http::header::{CACHE_CONTROL, HeaderValue};
use actix_web::{HttpResponse, get, web};
use chrono::SecondsFormat;
use mockable::Clock;
use serde::Serialize;

use super::envelope::ok;
use super::schemas::{DetailedHealthEnvelopeSchema, HealthEnvelopeSchema};
use super::state::HttpState;

/// Process start time and wall clock used by the health endpoints.
pub struct HealthState {
    started_at: Instant,
    clock: Arc<dyn Clock>,
}

impl HealthState {
    /// Start measuring uptime now.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            started_at: Instant::now(),
            clock,
        }
    }

    fn report(&self) -> HealthReport {
        HealthReport {
            status: "OK".to_owned(),
            timestamp: self.clock.utc().to_rfc3339_opts(SecondsFormat::Millis, true),
            uptime: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

/// Basic health payload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthReport {
    /// Always `OK` while the process serves requests.
    #[schema(example = "OK")]
    pub status: String,
    /// Current time, RFC 3339 with millisecond precision.
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
}

/// Health payload with build and runtime details.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DetailedHealthReport {
    pub status: String,
    pub timestamp: String,
    pub uptime: f64,
    /// Crate version.
    pub version: String,
    /// Operating system the server runs on.
    pub platform: String,
    /// Active storage backend, `sqlite` or `memory`.
    pub storage: String,
}

fn no_store(mut response: HttpResponse) -> HttpResponse {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Liveness check with uptime.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    responses((status = 200, description = "Server is alive", body = HealthEnvelopeSchema))
)]
#[get("/health")]
pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    no_store(ok(state.report(), "Health check successful"))
}

/// Liveness check with version, platform and storage backend.
#[utoipa::path(
    get,
    path = "/api/health/detailed",
    tags = ["health"],
    responses((status = 200, description = "Server is alive", body = DetailedHealthEnvelopeSchema))
)]
#[get("/health/detailed")]
pub async fn health_detailed(
    state: web::Data<HealthState>,
    http: web::Data<HttpState>,
) -> HttpResponse {
    let HealthReport {
        status,
        timestamp,
        uptime,
    } = state.report();
    let report = DetailedHealthReport {
        status,
        timestamp,
        uptime,
        version: env!("CARGO_PKG_VERSION").to_owned(),
        platform: std::env::consts::OS.to_owned(),
        storage: http.storage.kind().to_owned(),
    };
    no_store(ok(report, "Detailed health check successful"))
}
