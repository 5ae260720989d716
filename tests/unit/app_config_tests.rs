/*!
 * Tests for application configuration
 */

use std::time::Duration;
use subtitler::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};

fn config_with_key() -> Config {
    let mut config = Config::default();
    for provider in &mut config.translation.available_providers {
        if provider.provider_type == "openai" {
            provider.api_key = "sk-test".to_string();
        }
    }
    config
}

#[test]
fn test_default_shouldMatchPipelineDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "es");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.get_model(), "gpt-3.5-turbo");
    assert_eq!(config.translation.optimal_concurrent_requests(), 5);
    assert_eq!(config.translation.common.context_window, 2);
    assert_eq!(config.translation.common.temperature, 0.0);
    assert_eq!(config.subtitle.max_chars_per_caption, 140);
    assert!(config.subtitle.split_oversized);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "source_language": "fr",
        "target_language": "de",
        "translation": {
            "provider": "ollama",
            "available_providers": [{"type": "ollama", "model": "mistral"}]
        }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_model(), "mistral");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.common.retry_count, 3);
    assert_eq!(config.subtitle.max_chars_per_caption, 140);
    assert!(config.validate().is_ok());
}

#[test]
fn test_serialize_thenDeserialize_shouldPreserveProviderType() {
    let config = config_with_key();
    let json = serde_json::to_string_pretty(&config).unwrap();

    assert!(json.contains(r#""type": "openai""#));
    let back: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back.translation.get_api_key(), "sk-test");
}

#[test]
fn test_toBatchOptions_shouldMapCommonSettings() {
    let mut config = config_with_key();
    config.translation.common.retry_count = 4;
    config.translation.common.retry_backoff_ms = 250;
    config.translation.common.deadline_secs = Some(90);

    let options = config.to_batch_options();

    assert_eq!(options.window_size, 2);
    assert_eq!(options.max_concurrency, 5);
    assert_eq!(options.max_retries, 4);
    assert_eq!(options.base_backoff, Duration::from_millis(250));
    assert_eq!(options.deadline, Some(Duration::from_secs(90)));
}

#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let mut config = config_with_key();
    config.target_language = "zz".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroConcurrencyOrRetries_shouldFail() {
    let mut config = config_with_key();
    config.translation.available_providers[0].concurrent_requests = 0;
    assert!(config.validate().is_err());

    let mut config = config_with_key();
    config.translation.common.retry_count = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withOllamaAndNoKey_shouldPass() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    assert!(config.validate().is_ok());
}

#[test]
fn test_providerFromStr_shouldBeCaseInsensitive() {
    assert_eq!("OpenAI".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("ollama".parse::<TranslationProvider>().unwrap(), TranslationProvider::Ollama);
    assert!("anthropic".parse::<TranslationProvider>().is_err());
}

#[test]
fn test_getTimeoutSecs_withZero_shouldUseDefault() {
    let mut config = Config::default();
    let mut provider = ProviderConfig::new(TranslationProvider::OpenAI);
    provider.timeout_secs = 0;
    config.translation.available_providers = vec![provider];

    assert_eq!(config.translation.get_timeout_secs(), 30);
}

#[test]
fn test_transcription_withDefaults_shouldUseWhisperAndOpenAiEntry() {
    let mut config = config_with_key();
    config.translation.available_providers[0].endpoint = "http://proxy.local/v1".to_string();
    let settings = &config.transcription;

    assert_eq!(settings.model, "whisper-1");
    assert_eq!(settings.timeout_secs, 300);
    assert_eq!(settings.get_api_key(&config.translation), "sk-test");
    assert_eq!(settings.get_endpoint(&config.translation), "http://proxy.local/v1");
}

#[test]
fn test_transcription_withOwnSettings_shouldOverrideProviderEntry() {
    let json = r#"{
        "source_language": "es",
        "target_language": "en",
        "translation": {"available_providers": [{"type": "openai", "api_key": "sk-chat"}]},
        "transcription": {"model": "whisper-large", "api_key": "sk-audio", "endpoint": "http://stt.local/v1"}
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    let settings = &config.transcription;

    assert_eq!(settings.model, "whisper-large");
    assert_eq!(settings.timeout_secs, 300);
    assert_eq!(settings.get_api_key(&config.translation), "sk-audio");
    assert_eq!(settings.get_endpoint(&config.translation), "http://stt.local/v1");
}
