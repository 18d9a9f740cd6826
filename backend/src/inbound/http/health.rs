//! Health endpoints: liveness & readiness probes for orchestration and load
//! balancers, plus the database round-trip checker and the service banner.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::error;

use crate::domain::ports::{ConnectivityError, ConnectivityProbe, FixtureConnectivityProbe};

use super::schemas::MessageResponse;

/// Banner served at `/`.
pub const ROOT_MESSAGE: &str = "Contact management Application";
/// Body of a successful database round-trip.
pub const HEALTHY_MESSAGE: &str = "Welcome to the contact management API";

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    probe: Arc<dyn ConnectivityProbe>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new(Arc::new(FixtureConnectivityProbe))
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            probe,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness probes emit 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. Return 200 when dependencies are initialised and the server can handle traffic; return 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Run `SELECT 1` against the database.
///
/// Both failure kinds answer 500 with a fixed message; the cause is logged.
#[utoipa::path(
    get,
    path = "/api/healthchecker",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Database reachable", body = MessageResponse),
        (status = 500, description = "Database unreachable or misconfigured")
    )
)]
#[get("/api/healthchecker")]
pub async fn healthchecker(state: web::Data<HealthState>) -> HttpResponse {
    match state.probe.check().await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new(HEALTHY_MESSAGE)),
        Err(err) => {
            error!(error = %err, "database health check failed");
            let detail = match err {
                ConnectivityError::Misconfigured { .. } => "Database is not configured correctly",
                ConnectivityError::Unavailable { .. } => "Error connecting to the database",
            };
            HttpResponse::InternalServerError().json(serde_json::json!({ "detail": detail }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Service banner", body = MessageResponse))
)]
#[get("/")]
pub async fn root() -> web::Json<MessageResponse> {
    web::Json(MessageResponse::new(ROOT_MESSAGE))
}

/// Register probe, checker and banner routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(ready)
        .service(live)
        .service(healthchecker)
        .service(root);
}
