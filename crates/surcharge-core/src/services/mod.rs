//! Application services built on top of the ports.

mod calculation;
mod call_log;
mod percentage;
mod retry;

pub use calculation::{CalculationService, apply_percentage};
pub use call_log::CallLogService;
pub use percentage::{PERCENTAGE_KEY, PercentageCache, PercentageCacheConfig};
pub use retry::{RetryExhausted, RetryPolicy};
