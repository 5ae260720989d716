/*!
 * # subtitler
 *
 * A Rust library for turning transcripts into timed captions and
 * translating caption files with AI providers.
 *
 * ## Features
 *
 * - SRT reading and writing with a lenient parser
 * - Splitting of captions that are too long to read
 * - Caption documents from Whisper-style transcript segments
 * - Context-aware translation, one caption at a time, using:
 *   - OpenAI API
 *   - Ollama (local LLM)
 * - Bounded concurrency with rate-limit backoff and per-caption fallback
 * - ffmpeg helpers for audio extraction and subtitle embedding
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: `HH:MM:SS,mmm` clock times
 * - `subtitle_processor`: caption documents and SRT serialization
 * - `segmentation`: readability splitting
 * - `transcription`: transcript segments to captions
 * - `translation`: context windows, the batch orchestrator and the
 *   provider-backed translation service
 * - `providers`: HTTP clients for the LLM providers
 * - `media`: ffmpeg collaborators
 * - `app_config`, `app_controller`, `file_utils`, `language_utils`, `errors`
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;
pub mod providers;
pub mod segmentation;
pub mod subtitle_processor;
pub mod timecode;
pub mod transcription;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use timecode::ClockTime;
pub use transcription::{Transcriber, TranscriptSegment};
pub use translation::{BatchOptions, BatchOutcome, BatchTranslator, TranslationService, Translator};
