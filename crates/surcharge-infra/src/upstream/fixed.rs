use async_trait::async_trait;

use surcharge_core::ports::{PercentageProvider, UpstreamError};

/// Provider that always answers with the same percentage.
///
/// Stands in for the external service when no URL is configured.
#[derive(Debug, Clone, Copy)]
pub struct FixedPercentageProvider {
    value: f64,
}

impl FixedPercentageProvider {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Default for FixedPercentageProvider {
    fn default() -> Self {
        Self::new(10.0)
    }
}

#[async_trait]
impl PercentageProvider for FixedPercentageProvider {
    async fn fetch_percentage(&self) -> Result<f64, UpstreamError> {
        Ok(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_is_ten_percent() {
        let provider = FixedPercentageProvider::default();
        assert_eq!(provider.fetch_percentage().await.unwrap(), 10.0);
        assert_eq!(FixedPercentageProvider::new(2.5).fetch_percentage().await.unwrap(), 2.5);
    }
}
