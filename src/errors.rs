/*!
 * Error types for the subtitler application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status into a provider error
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            429 => Self::RateLimitExceeded(message),
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// A clock time string does not match `HH:MM:SS,mmm`
    #[error("Invalid clock time format: {0:?}")]
    Format(String),

    /// The document as a whole cannot be processed
    #[error("Failed to parse subtitle document: {0}")]
    Parse(String),

    /// A single caption violates its invariants
    #[error("Invalid subtitle entry: {0}")]
    InvalidEntry(String),

    /// Replacement texts do not line up with the document's captions
    #[error("Expected {expected} caption texts, got {actual}")]
    LengthMismatch {
        /// Number of captions in the document
        expected: usize,
        /// Number of texts supplied
        actual: usize,
    },
}

/// Errors that can occur during translation of a single caption
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Transient rate limiting, eligible for retry with backoff
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// The provider answered with nothing usable
    #[error("Provider returned an empty translation")]
    EmptyResponse,

    /// Rate limiting persisted through every attempt
    #[error("Retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
    },

    /// The caller-supplied deadline passed before the unit finished
    #[error("Translation deadline exceeded")]
    DeadlineExceeded,

    /// Any other failure raised by a translator implementation
    #[error("Translation failed: {0}")]
    Failed(String),
}

impl TranslationError {
    /// Whether this error should be retried with backoff
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::RateLimitExceeded(message) => Self::RateLimited(message),
            other => Self::Provider(other),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
