use std::sync::Arc;

use crate::error::DomainError;
use crate::services::PercentageCache;

/// Adds two numbers and applies the external percentage on top of the sum.
pub struct CalculationService {
    percentages: Arc<PercentageCache>,
}

impl CalculationService {
    pub fn new(percentages: Arc<PercentageCache>) -> Self {
        Self { percentages }
    }

    pub async fn calculate(&self, number1: f64, number2: f64) -> Result<f64, DomainError> {
        ensure_finite("number1", number1)?;
        ensure_finite("number2", number2)?;

        let percentage = self.percentages.get_value().await?;
        let result = apply_percentage(number1 + number2, percentage);

        tracing::debug!(number1, number2, percentage, result, "Calculated surcharge");
        Ok(result)
    }
}

/// `sum` increased by `percentage` percent.
pub fn apply_percentage(sum: f64, percentage: f64) -> f64 {
    sum + sum * percentage / 100.0
}

fn ensure_finite(name: &str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("{name} must be a finite number")))
    }
}
