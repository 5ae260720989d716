/*!
 * Tests for error classification
 */

use subtitler::errors::{AppError, ProviderError, SubtitleError, TranslationError};

#[test]
fn test_fromStatus_shouldClassifyByStatusCode() {
    assert!(matches!(
        ProviderError::from_status(429, "slow down".into()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(401, "bad key".into()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden".into()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "boom".into()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_translationErrorFromProvider_shouldOnlyRetryRateLimits() {
    let rate_limited: TranslationError = ProviderError::RateLimitExceeded("429".into()).into();
    assert!(rate_limited.is_rate_limited());

    let auth: TranslationError = ProviderError::AuthenticationError("401".into()).into();
    assert!(!auth.is_rate_limited());
    assert!(matches!(auth, TranslationError::Provider(_)));

    assert!(!TranslationError::EmptyResponse.is_rate_limited());
    assert!(!TranslationError::RetriesExhausted { attempts: 3 }.is_rate_limited());
}

#[test]
fn test_display_shouldIncludeDetails() {
    let err = TranslationError::RetriesExhausted { attempts: 4 };
    assert_eq!(err.to_string(), "Retries exhausted after 4 attempts");

    let err = SubtitleError::LengthMismatch { expected: 3, actual: 2 };
    assert_eq!(err.to_string(), "Expected 3 caption texts, got 2");
}

#[test]
fn test_appError_shouldWrapSourceErrors() {
    let app: AppError = SubtitleError::Parse("empty".into()).into();
    assert!(matches!(app, AppError::Subtitle(_)));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = TranslationError::DeadlineExceeded.into();
    assert!(app.to_string().contains("deadline"));
}
