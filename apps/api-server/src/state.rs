//! Application state - shared across all handlers and middleware.

use std::sync::Arc;

use surcharge_core::ports::{Cache, CallLogRepository, PercentageProvider, RateLimiter};
use surcharge_core::services::{
    CalculationService, CallLogService, PercentageCache, PercentageCacheConfig,
};
use surcharge_infra::cache::InMemoryCache;
use surcharge_infra::database::{DatabaseConfig, InMemoryCallLogRepository};
use surcharge_infra::rate_limit::InMemoryRateLimiter;
use surcharge_infra::upstream::{
    FixedPercentageProvider, HttpPercentageConfig, HttpPercentageProvider,
};

#[cfg(feature = "postgres")]
use surcharge_infra::database::{PostgresCallLogRepository, connect};

#[cfg(feature = "redis")]
use surcharge_infra::cache::{RedisCache, RedisConfig};

use crate::config::{AppConfig, PercentageConfig, RecorderConfig};
use crate::middleware::PathAllowlist;
use crate::observability::ThrottledLogGate;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<CalculationService>,
    pub percentages: Arc<PercentageCache>,
    pub call_logs: Arc<CallLogService>,
    pub limiter: Arc<dyn RateLimiter>,
    pub allowlist: Arc<PathAllowlist>,
    /// One gate per process, shared by every worker's recorder.
    pub log_gate: ThrottledLogGate,
    pub max_body_bytes: usize,
}

/// Port implementations the state is assembled from.
pub struct Components {
    pub cache: Arc<dyn Cache>,
    pub provider: Arc<dyn PercentageProvider>,
    pub call_log_repo: Arc<dyn CallLogRepository>,
    pub limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let components = Components {
            cache: init_cache(config).await?,
            provider: init_provider(&config.percentage)?,
            call_log_repo: init_call_log_repo(config.database.as_ref()).await,
            limiter: Arc::new(InMemoryRateLimiter::new(&config.rate_limit)?),
        };

        let state = Self::assemble(
            components,
            config.percentage.cache.clone(),
            &config.allowlist,
            &config.recorder,
        )?;

        tracing::info!(
            cache = state.percentages.cache_backend(),
            call_logs = state.call_logs.backend(),
            "Application state initialized"
        );
        Ok(state)
    }

    pub fn assemble(
        components: Components,
        percentage: PercentageCacheConfig,
        allowlist: &[String],
        recorder: &RecorderConfig,
    ) -> anyhow::Result<Self> {
        let percentages = Arc::new(PercentageCache::new(
            components.cache,
            components.provider,
            percentage,
        ));

        Ok(Self {
            calculator: Arc::new(CalculationService::new(Arc::clone(&percentages))),
            percentages,
            call_logs: Arc::new(CallLogService::new(components.call_log_repo)),
            limiter: components.limiter,
            allowlist: Arc::new(PathAllowlist::new(allowlist)?),
            log_gate: ThrottledLogGate::new(recorder.suppression_window),
            max_body_bytes: recorder.max_body_bytes,
        })
    }
}

#[cfg(feature = "redis")]
async fn init_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    let redis: &RedisConfig = &config.redis;
    match RedisCache::new(redis).await {
        Ok(cache) => Ok(Arc::new(cache)),
        Err(e) if redis.fallback_to_memory => {
            tracing::warn!(error = %e, "Redis unavailable. Using in-memory cache.");
            Ok(Arc::new(InMemoryCache::new()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(feature = "redis"))]
async fn init_cache(_config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    tracing::info!("Running without redis feature - using in-memory cache");
    Ok(Arc::new(InMemoryCache::new()))
}

fn init_provider(config: &PercentageConfig) -> anyhow::Result<Arc<dyn PercentageProvider>> {
    match &config.service_url {
        Some(url) => {
            let http = HttpPercentageConfig {
                url: url.clone(),
                timeout: config.timeout,
            };
            Ok(Arc::new(HttpPercentageProvider::new(&http)?))
        }
        None => {
            tracing::warn!(
                value = config.fallback_value,
                "PERCENTAGE_SERVICE_URL not set. Serving a fixed percentage."
            );
            Ok(Arc::new(FixedPercentageProvider::new(config.fallback_value)))
        }
    }
}

#[cfg(feature = "postgres")]
async fn init_call_log_repo(db_config: Option<&DatabaseConfig>) -> Arc<dyn CallLogRepository> {
    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Keeping call logs in memory.");
        return Arc::new(InMemoryCallLogRepository::new());
    };

    match connect(config).await {
        Ok(conn) => Arc::new(PostgresCallLogRepository::new(conn)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            Arc::new(InMemoryCallLogRepository::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn init_call_log_repo(db_config: Option<&DatabaseConfig>) -> Arc<dyn CallLogRepository> {
    if db_config.is_some() {
        tracing::warn!("DATABASE_URL ignored without postgres feature");
    }
    tracing::info!("Running without postgres feature - using in-memory call log store");
    Arc::new(InMemoryCallLogRepository::new())
}
