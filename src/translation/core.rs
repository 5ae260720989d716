/*!
 * Core translation service implementation.
 *
 * `TranslationService` is the production `Translator`: it is built once from
 * the configuration, owns the provider client and makes exactly one provider
 * request per call.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::trace;
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};

use super::batch::Translator;
use super::prompts::{PromptTemplate, build_user_prompt};

/// Parse an endpoint string into host and port
pub fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?
        .to_string();

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    Ok((host, port))
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },
}

/// Main translation service for caption translation
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Display name of the source language, used in the system prompt
    source_language: String,

    system_prompt: PromptTemplate,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig, source_language: &str) -> Result<Self> {
        let timeout_secs = config.get_timeout_secs();

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => {
                let endpoint = config.get_endpoint();
                let (host, port) = parse_endpoint(&endpoint)?;
                // Keep an explicit https scheme, plain host otherwise
                let host = if endpoint.starts_with("https://") {
                    format!("https://{}", host)
                } else {
                    host
                };

                TranslationProviderImpl::Ollama {
                    client: Ollama::new(host, port, timeout_secs),
                }
            }
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
        };

        let source_language = language_utils::get_language_name(source_language)
            .unwrap_or_else(|_| source_language.to_string());
        let system_prompt = PromptTemplate::new(&config.common.system_prompt);

        Ok(Self {
            provider,
            config,
            source_language,
            system_prompt,
        })
    }

    fn render_system_prompt(&self, target_language: &str) -> String {
        let target_name = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());
        self.system_prompt.render(&self.source_language, &target_name)
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        before: &[String],
        after: &[String],
    ) -> Result<String, TranslationError> {
        // Nothing to translate
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let system_prompt = self.render_system_prompt(target_language);
        let user_prompt = build_user_prompt(text, target_language, before, after);
        trace!("Translation prompt:\n{}", user_prompt);

        let translated = match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(self.config.get_model(), user_prompt)
                    .system(system_prompt)
                    .temperature(self.config.common.temperature);

                let response = client.complete(request).await?;
                Ollama::extract_text(&response)
            }
            TranslationProviderImpl::OpenAI { client } => {
                let request = OpenAIRequest::new(self.config.get_model())
                    .add_message("system", system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(self.config.common.temperature);

                let response = client.complete(request).await?;
                OpenAI::extract_text(&response)
            }
        };

        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(translated)
    }
}
