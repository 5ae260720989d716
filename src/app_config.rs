use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::time::Duration;

use crate::segmentation::DEFAULT_MAX_CHARS;
use crate::translation::batch::BatchOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Caption segmentation config
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// Speech-to-text config
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI chat completions
    #[default]
    OpenAI,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, falls back to OPENAI_API_KEY for openai
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Worker slots for the batch translator
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum attempts per caption when the provider is rate limited
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Neighbouring captions sent on each side of the one being translated
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Overall time budget for one document, unlimited when absent
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            context_window: default_context_window(),
            deadline_secs: None,
        }
    }
}

/// Configuration for caption segmentation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Character budget per caption before it gets split
    #[serde(default = "default_max_chars_per_caption")]
    pub max_chars_per_caption: usize,

    /// Whether oversized captions are split before translation
    #[serde(default = "default_true")]
    pub split_oversized: bool,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            max_chars_per_caption: default_max_chars_per_caption(),
            split_oversized: true,
        }
    }
}

/// Speech-to-text settings for the Whisper endpoint
///
/// Empty `api_key` and `endpoint` are taken from the `openai` provider
/// entry, then from `OPENAI_API_KEY` and the public API.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default = "default_transcription_model")]
    pub model: String,

    #[serde(default = "String::new")]
    pub api_key: String,

    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Upload and transcription can take minutes for long audio
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: default_transcription_model(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

impl TranscriptionConfig {
    fn openai_entry<'a>(&self, translation: &'a TranslationConfig) -> Option<&'a ProviderConfig> {
        translation.available_providers.iter().find(|p| p.provider_type == "openai")
    }

    /// API key, falling back to the openai provider entry and `OPENAI_API_KEY`
    pub fn get_api_key(&self, translation: &TranslationConfig) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }

        match self.openai_entry(translation) {
            Some(provider) if !provider.api_key.is_empty() => provider.api_key.clone(),
            _ => std::env::var("OPENAI_API_KEY").unwrap_or_default(),
        }
    }

    /// API base URL, falling back to the openai provider entry
    pub fn get_endpoint(&self, translation: &TranslationConfig) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }

        match self.openai_entry(translation) {
            Some(provider) if !provider.endpoint.is_empty() => provider.endpoint.clone(),
            _ => default_openai_endpoint(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.0
}

fn default_context_window() -> usize {
    2
}

fn default_max_chars_per_caption() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate exactly the indicated text from {source_language} to {target_language}, using the surrounding context to get the best possible translation. Do not add comments or explanations. Reply with the translation only.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.source_language)?;
        crate::language_utils::validate_language_code(&self.target_language)?;

        if self.translation.optimal_concurrent_requests() == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }

        if self.translation.common.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }

        if self.subtitle.max_chars_per_caption == 0 {
            return Err(anyhow!("max_chars_per_caption must be at least 1"));
        }

        if self.translation.provider == TranslationProvider::OpenAI
            && self.translation.get_api_key().is_empty()
        {
            return Err(anyhow!(
                "Translation API key is required for OpenAI provider (set api_key or OPENAI_API_KEY)"
            ));
        }

        Ok(())
    }

    /// Orchestrator options derived from the active provider and common settings
    pub fn to_batch_options(&self) -> BatchOptions {
        let common = &self.translation.common;
        BatchOptions {
            window_size: common.context_window,
            max_concurrency: self.translation.optimal_concurrent_requests(),
            max_retries: common.retry_count,
            base_backoff: Duration::from_millis(common.retry_backoff_ms),
            deadline: common.deadline_secs.map(Duration::from_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "es".to_string(),
            target_language: "en".to_string(),
            translation: TranslationConfig::default(),
            subtitle: SubtitleConfig::default(),
            transcription: TranscriptionConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    pub fn optimal_concurrent_requests(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.concurrent_requests;
        }

        default_concurrent_requests()
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the API key for the active provider
    ///
    /// An empty OpenAI key is taken from `OPENAI_API_KEY`.
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        match self.provider {
            TranslationProvider::OpenAI => std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            TranslationProvider::Ollama => String::new(),
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
