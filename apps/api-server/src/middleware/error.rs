//! Error handling - one JSON error body for every failure path.

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, HttpResponse, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::QueryPayloadError,
    http::StatusCode,
};
use futures::future::LocalBoxFuture;
use surcharge_core::DomainError;
use surcharge_core::error::RepoError;
use surcharge_shared::ErrorResponse;

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing parameters: {0}")]
    MissingParameters(String),

    #[error("Invalid parameter type: {0}")]
    InvalidParameterType(String),

    #[error("Invalid request parameters: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("External service retries exhausted: {0}")]
    ExternalService(String),

    #[error("Error accessing the database: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable summary written to `message`.
    pub fn message(&self) -> &'static str {
        match self {
            AppError::MissingParameters(_) => "Missing parameters",
            AppError::InvalidParameterType(_) => "Invalid parameter type",
            AppError::InvalidRequest(_) => "Invalid request parameters",
            AppError::NotFound(_) => "Resource not found",
            AppError::ExternalService(_) => "External service retries exhausted",
            AppError::Database(_) => "Error accessing the database",
            AppError::Internal(_) => "Internal server error",
        }
    }

    /// Text written to `details`. Internal faults are not disclosed.
    pub fn details(&self) -> String {
        match self {
            AppError::MissingParameters(detail)
            | AppError::InvalidParameterType(detail)
            | AppError::InvalidRequest(detail)
            | AppError::NotFound(detail)
            | AppError::ExternalService(detail) => detail.clone(),
            AppError::Database(_) => "The call log store is unavailable".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }

    fn body(&self, path: &str) -> ErrorResponse {
        ErrorResponse::new(self.message(), self.details(), path)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingParameters(_)
            | AppError::InvalidParameterType(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The path is filled in by [`ErrorNormalizer`].
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body(""))
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::InvalidRequest(msg),
            err @ DomainError::ExternalService { .. } => {
                tracing::error!(error = %err, "Percentage service unavailable");
                AppError::ExternalService(err.to_string())
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        tracing::error!(error = %err, "Call log store error");
        AppError::Database(err.to_string())
    }
}

impl From<&QueryPayloadError> for AppError {
    fn from(err: &QueryPayloadError) -> Self {
        let detail = err.to_string();
        if detail.contains("missing field") {
            AppError::MissingParameters(detail)
        } else if detail.contains("invalid") {
            AppError::InvalidParameterType(detail)
        } else {
            AppError::InvalidRequest(detail)
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Maps an error attached to a response onto status and body.
fn normalize(err: &Error, status: StatusCode, path: &str) -> (StatusCode, ErrorResponse) {
    if let Some(app) = err.as_error::<AppError>() {
        return (app.status_code(), app.body(path));
    }
    if let Some(query) = err.as_error::<QueryPayloadError>() {
        let app = AppError::from(query);
        return (app.status_code(), app.body(path));
    }
    if status.is_client_error() {
        return (
            status,
            ErrorResponse::new("Invalid request parameters", err.to_string(), path),
        );
    }

    tracing::error!(error = %err, %path, "Unhandled error");
    let internal = AppError::Internal(err.to_string());
    (internal.status_code(), internal.body(path))
}

/// Rewrites every error response into the standard [`ErrorResponse`] body,
/// including the request path.
pub struct ErrorNormalizer;

impl<S, B> Transform<S, ServiceRequest> for ErrorNormalizer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ErrorNormalizerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorNormalizerService {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorNormalizerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorNormalizerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let res = service.call(req).await?;

            let Some(err) = res.response().error() else {
                return Ok(res.map_into_left_body());
            };
            let (status, body) = normalize(err, res.status(), res.request().path());

            let (http_req, _) = res.into_parts();
            let response = HttpResponse::build(status).json(body);
            Ok(ServiceResponse::new(http_req, response).map_into_right_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surcharge_core::ports::UpstreamError;

    #[test]
    fn status_and_message_per_kind() {
        let cases = [
            (AppError::MissingParameters("x".into()), 400, "Missing parameters"),
            (AppError::InvalidParameterType("x".into()), 400, "Invalid parameter type"),
            (AppError::InvalidRequest("x".into()), 400, "Invalid request parameters"),
            (AppError::NotFound("x".into()), 404, "Resource not found"),
            (AppError::ExternalService("x".into()), 502, "External service retries exhausted"),
            (AppError::Database("x".into()), 503, "Error accessing the database"),
            (AppError::Internal("x".into()), 500, "Internal server error"),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status_code().as_u16(), status);
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn exhausted_upstream_maps_to_bad_gateway() {
        let err: AppError = DomainError::ExternalService {
            attempts: 3,
            source: UpstreamError::Status(503),
        }
        .into();
        assert!(matches!(err, AppError::ExternalService(_)));
        assert!(err.details().contains("3 attempts"));
    }

    #[test]
    fn store_details_are_not_leaked() {
        let err: AppError = RepoError::Connection("password=hunter2".into()).into();
        assert!(!err.details().contains("hunter2"));
    }
}
