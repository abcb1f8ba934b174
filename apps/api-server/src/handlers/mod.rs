//! HTTP handlers and route configuration.

mod calculation;
mod call_logs;
mod health;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default().error_handler(|err, _req| AppError::from(&err).into()),
    )
    .route("/health", web::get().to(health::health_check))
    .route("/calculation", web::get().to(calculation::calculate))
    .route("/calculation/", web::get().to(calculation::calculate))
    .route("/call-logs", web::get().to(call_logs::list_call_logs))
    .route("/call-logs/", web::get().to(call_logs::list_call_logs));
}

/// Fallback for unknown paths and unsupported methods on known ones.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}
