//! HTTP client for the analysis service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use super::service::{AnalysisOutcome, AnalysisService};
use super::types::{AnalyzeRequest, FinalAnalysisRequest, ServiceEnvelope};
use crate::error::{Exchange, TransportError};

/// reqwest-backed [`AnalysisService`].
///
/// # Example
///
/// ```rust,no_run
/// use symptom_checker::analysis::{AnalysisService, AnalyzeRequest, HttpAnalysisClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpAnalysisClient::new("http://localhost:5000")?;
/// let outcome = client
///     .analyze(&AnalyzeRequest { symptoms: "headache, fever".into() })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpAnalysisClient {
    /// Create a client with no request timeout.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, TransportError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Url::join drops the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, exchange: Exchange) -> Result<Url, TransportError> {
        Ok(self.base_url.join(exchange.path())?)
    }

    async fn post<B: Serialize + Sync>(
        &self,
        exchange: Exchange,
        body: &B,
    ) -> Result<AnalysisOutcome, TransportError> {
        let url = self.url(exchange)?;
        tracing::debug!(url = %url, exchange = %exchange, "Posting to analysis service");

        let response = self.http.post(url).json(body).send().await?;
        let envelope = Self::handle_response(response).await?;

        if !envelope.is_success() {
            tracing::warn!(
                exchange = %exchange,
                status = %envelope.status,
                "Analysis service reported a non-success status"
            );
        }
        Ok(envelope.into())
    }

    async fn handle_response(response: reqwest::Response) -> Result<ServiceEnvelope, TransportError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(TransportError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisOutcome, TransportError> {
        self.post(Exchange::Initial, request).await
    }

    async fn final_analysis(
        &self,
        request: &FinalAnalysisRequest,
    ) -> Result<AnalysisOutcome, TransportError> {
        self.post(Exchange::Final, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let client = HttpAnalysisClient::new("http://localhost:5000").unwrap();
        assert_eq!(
            client.url(Exchange::Initial).unwrap().as_str(),
            "http://localhost:5000/analyze"
        );
        assert_eq!(
            client.url(Exchange::Final).unwrap().as_str(),
            "http://localhost:5000/final_analysis"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = HttpAnalysisClient::new("http://example.com/chatbot").unwrap();
        assert_eq!(client.base_url().as_str(), "http://example.com/chatbot/");
        assert_eq!(
            client.url(Exchange::Initial).unwrap().as_str(),
            "http://example.com/chatbot/analyze"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpAnalysisClient::new("not a url"),
            Err(TransportError::InvalidUrl(_))
        ));
    }
}
