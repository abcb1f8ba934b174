//! Middleware modules.

pub mod error;
pub mod rate_limit;

pub use error::{AppError, AppResult, ErrorNormalizer};
pub use rate_limit::{PathAllowlist, RateLimitMiddleware};
