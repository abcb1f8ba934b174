//! HTTP client for the external percentage service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use surcharge_core::ports::{PercentageProvider, UpstreamError};

/// Where and how to reach the percentage service.
#[derive(Debug, Clone)]
pub struct HttpPercentageConfig {
    /// Full URL answering `GET` with a bare JSON number.
    pub url: String,
    /// Per-attempt timeout, connect included.
    pub timeout: Duration,
}

impl HttpPercentageConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(2),
        }
    }
}

/// `PercentageProvider` backed by a plain `GET` request.
pub struct HttpPercentageProvider {
    client: Client,
    url: String,
}

impl HttpPercentageProvider {
    pub fn new(config: &HttpPercentageConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        tracing::info!(url = %config.url, timeout_ms = config.timeout.as_millis() as u64, "Percentage service client ready");

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl PercentageProvider for HttpPercentageProvider {
    async fn fetch_percentage(&self) -> Result<f64, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let value: f64 = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidPayload(e.to_string()))?;

        if !value.is_finite() {
            return Err(UpstreamError::InvalidPayload(format!(
                "expected a finite number, got {value}"
            )));
        }

        tracing::debug!(value, "Fetched percentage from upstream");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> HttpPercentageProvider {
        let config = HttpPercentageConfig {
            url: format!("{}/percentage", server.uri()),
            timeout: Duration::from_millis(500),
        };
        HttpPercentageProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_reads_json_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/percentage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("12.5"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(provider.fetch_percentage().await.unwrap(), 12.5);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(
            provider.fetch_percentage().await,
            Err(UpstreamError::Status(503))
        );
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"ten\""))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert!(matches!(
            provider.fetch_percentage().await,
            Err(UpstreamError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("10.0")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert!(matches!(
            provider.fetch_percentage().await,
            Err(UpstreamError::Request(_))
        ));
    }
}
