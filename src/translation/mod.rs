/*!
 * Caption translation.
 *
 * - `context`: neighbouring-caption windows taken from the source document
 * - `batch`: the `Translator` capability and the concurrent batch orchestrator
 * - `core`: the provider-backed `TranslationService`
 * - `prompts`: system and user prompt construction
 */

// Re-export main types for easier usage
pub use self::batch::{BatchOptions, BatchOutcome, BatchTranslator, Translator, UnitOutcome, UnitState};
pub use self::context::ContextWindow;
pub use self::core::TranslationService;

// Submodules
pub mod batch;
pub mod context;
pub mod core;
pub mod prompts;
