/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also serves OpenAI-compatible servers)
 *
 * Clients make exactly one request per call. Retrying is the caller's job,
 * so a rate limit surfaces as `ProviderError::RateLimitExceeded` instead of
 * being absorbed here.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Map a transport-level reqwest failure to a provider error
pub(crate) fn classify_send_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, error))
    }
}

/// Turn a non-success HTTP response into a provider error
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::debug!("{} API error ({}): {}", provider, status, error_text);
    ProviderError::from_status(status.as_u16(), error_text)
}

pub mod ollama;
pub mod openai;
