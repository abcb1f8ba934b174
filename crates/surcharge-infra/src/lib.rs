//! # Surcharge Infrastructure
//!
//! Concrete implementations of the ports defined in `surcharge-core`:
//! caches, the token bucket, the upstream percentage client, and the
//! call-log stores.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external stores, in-memory only
//! - `postgres` - PostgreSQL call-log store via SeaORM
//! - `redis` - Redis-backed percentage cache

pub mod cache;
pub mod database;
pub mod rate_limit;
pub mod upstream;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{DatabaseConfig, InMemoryCallLogRepository};
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
pub use upstream::{FixedPercentageProvider, HttpPercentageConfig, HttpPercentageProvider};

// Re-exports - External stores
#[cfg(feature = "postgres")]
pub use database::PostgresCallLogRepository;
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
