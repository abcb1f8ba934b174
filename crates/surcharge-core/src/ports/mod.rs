//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod rate_limit;
mod repository;
mod upstream;

pub use cache::{Cache, CacheError};
pub use rate_limit::{Admission, RateLimitError, RateLimiter};
pub use repository::CallLogRepository;
pub use upstream::{PercentageProvider, UpstreamError};
