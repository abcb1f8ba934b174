//! Rate limiting middleware.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use futures::future::LocalBoxFuture;
use regex::RegexSet;
use surcharge_core::ports::RateLimiter;
use surcharge_shared::ErrorResponse;

/// Milliseconds until the next token, sent with every 429.
pub const RETRY_AFTER_HEADER: &str = "x-rate-limit-retry-after-milliseconds";
/// Tokens left after an admitted request.
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";

/// Paths that skip admission control, matched against the whole path either
/// literally or as a regular expression.
pub struct PathAllowlist {
    exact: Vec<String>,
    patterns: RegexSet,
}

impl PathAllowlist {
    pub fn new<I, P>(paths: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let exact: Vec<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();
        let patterns = RegexSet::new(exact.iter().map(|p| format!("^(?:{p})$")))?;
        Ok(Self { exact, patterns })
    }

    pub fn is_allowed(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path) || self.patterns.is_match(path)
    }
}

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    allowlist: Arc<PathAllowlist>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>, allowlist: Arc<PathAllowlist>) -> Self {
        Self { limiter, allowlist }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
            allowlist: Arc::clone(&self.allowlist),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    allowlist: Arc<PathAllowlist>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
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
        let limiter = Arc::clone(&self.limiter);

        if self.allowlist.is_allowed(req.path()) {
            return Box::pin(async move {
                let res = service.call(req).await?;
                Ok(res.map_into_left_body())
            });
        }

        Box::pin(async move {
            match limiter.try_admit().await {
                Ok(admission) if admission.admitted => {
                    let mut res = service.call(req).await?;
                    res.headers_mut().insert(
                        HeaderName::from_static(REMAINING_HEADER),
                        HeaderValue::from(admission.remaining),
                    );
                    Ok(res.map_into_left_body())
                }
                Ok(admission) => {
                    let retry_after_ms = admission.retry_after_millis();
                    tracing::warn!(path = %req.path(), retry_after_ms, "Rate limit exceeded");

                    let response = HttpResponse::TooManyRequests()
                        .insert_header((RETRY_AFTER_HEADER, retry_after_ms.to_string()))
                        .json(ErrorResponse::too_many_requests(req.path()));

                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                Err(e) => {
                    // Fail open
                    tracing::error!(error = %e, "Rate limiter error, admitting request");
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_matches_whole_path() {
        let allowlist = PathAllowlist::new(crate::config::DEFAULT_ALLOWLIST).unwrap();

        assert!(allowlist.is_allowed("/health"));
        assert!(allowlist.is_allowed("/v3/api-docs"));
        assert!(allowlist.is_allowed("/swagger-ui.html"));
        assert!(allowlist.is_allowed("/webjars/swagger-ui/index.css"));

        assert!(!allowlist.is_allowed("/webjars/swagger-ui/"));
        assert!(!allowlist.is_allowed("/calculation/"));
        assert!(!allowlist.is_allowed("/health/deep"));
        assert!(!allowlist.is_allowed("/api/health"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        assert!(PathAllowlist::new(["/docs/(unclosed"]).is_err());
    }
}
