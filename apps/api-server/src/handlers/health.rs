//! Health check endpoint.

use actix_web::{HttpResponse, web};
use surcharge_shared::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - returns server status and the active stores.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        call_log_store: state.call_logs.backend().to_string(),
        cache_store: state.percentages.cache_backend().to_string(),
    };

    HttpResponse::Ok().json(response)
}
