//! Upstream percentage providers.

mod fixed;
mod http;

pub use fixed::FixedPercentageProvider;
pub use http::{HttpPercentageConfig, HttpPercentageProvider};
