use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::Client;

use crate::errors::ProviderError;
use super::{Provider, classify_send_error, error_from_response};

/// Client for a local Ollama server
#[derive(Debug)]
pub struct Ollama {
    /// Base URL including scheme and port
    base_url: String,
    /// HTTP client for API requests
    client: Client,
}

/// Generation options
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Request body for `/api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Model name
    pub model: String,
    /// User prompt
    pub prompt: String,
    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Always false, a single JSON object is expected back
    pub stream: bool,
    #[serde(default)]
    pub options: GenerationOptions,
}

/// Response body for `/api/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            stream: false,
            options: GenerationOptions::default(),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }
}

impl Ollama {
    /// Create a client from host and port
    ///
    /// The host may carry its own scheme; a scheme without a port gets the
    /// given port appended.
    pub fn new(host: impl Into<String>, port: u16, timeout_secs: u64) -> Self {
        let host = host.into();

        let base_url = match host.split_once("://") {
            Some((scheme, rest)) if rest.contains(':') => format!("{}://{}", scheme, rest),
            Some((scheme, rest)) => format!("{}://{}:{}", scheme, rest.trim_end_matches('/'), port),
            None => format!("http://{}:{}", host, port),
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = GenerationRequest;
    type Response = GenerationResponse;

    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_send_error("Ollama", e))?;

        if !response.status().is_success() {
            return Err(error_from_response("Ollama", response).await);
        }

        response.json::<GenerationResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Ollama: {}", e)))
    }

    fn extract_text(response: &GenerationResponse) -> String {
        response.response.trim().to_string()
    }
}
