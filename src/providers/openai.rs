use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use log::debug;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use reqwest::multipart::{Form, Part};

use crate::errors::ProviderError;
use crate::transcription::{Transcriber, TranscriptSegment};
use super::{Provider, classify_send_error, error_from_response};

/// OpenAI client for the chat completions API
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIRequest {
    /// Create a new request for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.openai.com/v1"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/{}", base, path)
    }

    fn completions_url(&self) -> String {
        self.api_url("chat/completions")
    }

    fn transcriptions_url(&self) -> String {
        self.api_url("audio/transcriptions")
    }

    /// Upload an audio file to the transcription endpoint
    ///
    /// Asks for `verbose_json` so the answer carries timed segments.
    /// `language` is an ISO 639-1 hint and may be omitted.
    pub async fn transcribe_file(
        &self,
        audio_path: &Path,
        model: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResponse, ProviderError> {
        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            ProviderError::RequestFailed(format!("OpenAI: cannot read {}: {}", audio_path.display(), e))
        })?;

        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());
        debug!("Uploading {} ({} bytes) for transcription with {}", file_name, audio.len(), model);

        let mut form = Form::new()
            .text("model", model.to_string())
            .text("response_format", "verbose_json")
            .part("file", Part::bytes(audio).file_name(file_name));
        if let Some(language) = language {
            form = form.text("language", language.to_string());
        }

        let mut builder = self.client.post(self.transcriptions_url()).multipart(form);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await
            .map_err(|e| classify_send_error("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        response.json::<TranscriptionResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("OpenAI transcription: {}", e)))
    }
}

/// Transcription response in `verbose_json` format
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    /// Detected or requested language
    #[serde(default)]
    pub language: Option<String>,

    /// Audio length in seconds
    #[serde(default)]
    pub duration: Option<f64>,

    /// Timed segments, relative to the start of the uploaded file
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// `Transcriber` backed by the OpenAI Whisper endpoint
#[derive(Debug)]
pub struct WhisperTranscriber {
    client: OpenAI,
    model: String,
    language: Option<String>,
}

impl WhisperTranscriber {
    pub fn new(client: OpenAI, model: impl Into<String>, language: Option<String>) -> Self {
        Self {
            client,
            model: model.into(),
            language,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> anyhow::Result<Vec<TranscriptSegment>> {
        let response = self.client
            .transcribe_file(audio_path, &self.model, self.language.as_deref())
            .await?;

        debug!(
            "Transcribed {} segment(s), language {}, {:.1}s of audio",
            response.segments.len(),
            response.language.as_deref().unwrap_or("unknown"),
            response.duration.unwrap_or_default()
        );

        Ok(response.segments)
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let mut builder = self.client.post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await
            .map_err(|e| classify_send_error("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let response = response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("OpenAI: {}", e)))?;

        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI usage: {} prompt + {} completion = {} tokens (finish: {})",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens,
                response.choices.first().and_then(|c| c.finish_reason.as_deref()).unwrap_or("unknown")
            );
        }

        Ok(response)
    }

    fn extract_text(response: &OpenAIResponse) -> String {
        response.choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default()
    }
}
