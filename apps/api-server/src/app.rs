//! Application assembly - routes plus the request pipeline.

use std::sync::Arc;

use actix_web::{
    App, Error,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web,
};
use tracing_actix_web::TracingLogger;

use crate::handlers;
use crate::middleware::{ErrorNormalizer, RateLimitMiddleware};
use crate::observability::CallRecorder;
use crate::state::AppState;

/// Build the app around `state`.
///
/// Middleware runs outermost first: request tracing, call recorder,
/// rate limiter, error normalizer, then routing.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let recorder = CallRecorder::new(
        Arc::clone(&state.call_logs),
        state.log_gate.clone(),
        state.max_body_bytes,
    );
    let rate_limit = RateLimitMiddleware::new(
        Arc::clone(&state.limiter),
        Arc::clone(&state.allowlist),
    );

    App::new()
        .app_data(web::Data::new(state))
        .configure(handlers::configure_routes)
        .default_service(web::to(handlers::not_found))
        .wrap(ErrorNormalizer)
        .wrap(rate_limit)
        .wrap(recorder)
        .wrap(TracingLogger::default())
}
