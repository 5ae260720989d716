/*!
 * Batch translation processing.
 *
 * Every caption becomes one translation unit. Units run on a bounded pool of
 * slots; each slot drives one unit through its retry loop before taking the
 * next. Results are written back by position, so output order never depends
 * on completion order. A unit that cannot be translated keeps its source
 * text and the batch as a whole always completes.
 */

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio::time::Instant;

use crate::errors::{SubtitleError, TranslationError};
use crate::subtitle_processor::{SubtitleCollection, collapse_lines};

use super::context::ContextWindow;

/// Capability that turns one caption into the target language.
///
/// `RateLimited` errors are retried with backoff; every other error is
/// treated as permanent for that caption.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        before: &[String],
        after: &[String],
    ) -> Result<String, TranslationError>;
}

/// Tuning for a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Captions of context on each side
    pub window_size: usize,

    /// Number of units in flight at once
    pub max_concurrency: usize,

    /// Attempts per unit while rate limited, at least one is always made
    pub max_retries: u32,

    /// Wait before the second attempt, doubled after every further attempt
    pub base_backoff: Duration,

    /// Overall budget for the batch, measured from the start of the run
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            window_size: 2,
            max_concurrency: 5,
            max_retries: 3,
            base_backoff: Duration::from_secs(1),
            deadline: None,
        }
    }
}

impl BatchOptions {
    /// Wait scheduled after the given zero-based attempt
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Lifecycle of a translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    InFlight,
    RetryScheduled,
    Succeeded,
    Failed,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::InFlight => "in-flight",
            Self::RetryScheduled => "retry-scheduled",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Final result for one caption
#[derive(Debug)]
pub enum UnitOutcome {
    Succeeded,
    /// The source text was kept
    Failed(TranslationError),
}

impl UnitOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One caption's worth of work
#[derive(Debug)]
pub struct TranslationUnit {
    pub position: usize,
    pub source_text: String,
    pub context: ContextWindow,
    pub state: UnitState,
    pub attempts: u32,
}

impl TranslationUnit {
    pub fn new(position: usize, source_text: impl Into<String>, context: ContextWindow) -> Self {
        Self {
            position,
            source_text: source_text.into(),
            context,
            state: UnitState::Pending,
            attempts: 0,
        }
    }

    fn transition(&mut self, next: UnitState) {
        debug!("Unit {}: {} -> {}", self.position + 1, self.state, next);
        self.state = next;
    }
}

/// Everything a batch run produced
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Translated text per position, source text where the unit failed
    pub texts: Vec<String>,
    /// Per-position outcome
    pub outcomes: Vec<UnitOutcome>,
    /// Per-position number of translator calls
    pub attempts: Vec<u32>,
}

impl BatchOutcome {
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.len() - self.failed_count()
    }

    pub fn total_attempts(&self) -> u64 {
        self.attempts.iter().map(|a| u64::from(*a)).sum()
    }

    /// Write the texts into a copy of the source document
    pub fn apply_to(&self, collection: &SubtitleCollection) -> Result<SubtitleCollection, SubtitleError> {
        collection.with_texts(self.texts.clone())
    }
}

struct UnitReport {
    position: usize,
    attempts: u32,
    result: Result<String, TranslationError>,
}

/// Concurrent, order-preserving caption translator
pub struct BatchTranslator {
    translator: Arc<dyn Translator>,
    options: BatchOptions,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(translator: Arc<dyn Translator>, options: BatchOptions) -> Self {
        Self { translator, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Translate every caption of `collection` into `target_language`.
    ///
    /// `progress_callback` receives `(completed, total)` as units finish.
    pub async fn translate_collection(
        &self,
        collection: &SubtitleCollection,
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> BatchOutcome {
        let total = collection.len();
        if total == 0 {
            return BatchOutcome::default();
        }

        // Context comes from the untranslated document only
        let windows = ContextWindow::build_all(collection, self.options.window_size);
        let units: Vec<TranslationUnit> = collection
            .entries
            .iter()
            .zip(windows)
            .enumerate()
            .map(|(position, (entry, context))| TranslationUnit::new(position, entry.text.clone(), context))
            .collect();

        let deadline = self.options.deadline.map(|budget| Instant::now() + budget);
        let completed = Arc::new(AtomicUsize::new(0));
        let translator = self.translator.as_ref();
        let options = &self.options;
        let slots = options.max_concurrency.max(1);

        info!(
            "Translating {} captions to {} with {} worker(s)",
            total, target_language, slots
        );

        let reports: Vec<UnitReport> = stream::iter(units)
            .map(|unit| {
                let completed = completed.clone();
                let progress_callback = progress_callback.clone();

                async move {
                    let report = run_unit(translator, unit, target_language, options, deadline).await;

                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total);

                    report
                }
            })
            .buffer_unordered(slots)
            .collect()
            .await;

        // Reassemble by position
        let mut texts: Vec<Option<String>> = vec![None; total];
        let mut outcomes: Vec<Option<UnitOutcome>> = (0..total).map(|_| None).collect();
        let mut attempts = vec![0u32; total];

        for report in reports {
            let position = report.position;
            attempts[position] = report.attempts;

            match report.result {
                Ok(text) => {
                    texts[position] = Some(text);
                    outcomes[position] = Some(UnitOutcome::Succeeded);
                }
                Err(e) => {
                    warn!(
                        "Caption {} kept in source language after {} attempt(s): {}",
                        position + 1,
                        report.attempts,
                        e
                    );
                    outcomes[position] = Some(UnitOutcome::Failed(e));
                }
            }
        }

        let outcome = BatchOutcome {
            texts: texts
                .into_iter()
                .zip(&collection.entries)
                .map(|(text, entry)| text.unwrap_or_else(|| entry.text.clone()))
                .collect(),
            outcomes: outcomes
                .into_iter()
                .map(|o| o.unwrap_or_else(|| UnitOutcome::Failed(TranslationError::Failed("unit did not report".to_string()))))
                .collect(),
            attempts,
        };

        info!(
            "Translated {}/{} captions, {} kept in source language, {} translator call(s)",
            outcome.succeeded_count(),
            total,
            outcome.failed_count(),
            outcome.total_attempts()
        );

        outcome
    }
}

/// Drive one unit to a terminal state within the optional deadline
async fn run_unit(
    translator: &dyn Translator,
    mut unit: TranslationUnit,
    target_language: &str,
    options: &BatchOptions,
    deadline: Option<Instant>,
) -> UnitReport {
    let result = match deadline {
        Some(at) if Instant::now() >= at => Err(TranslationError::DeadlineExceeded),
        Some(at) => {
            tokio::time::timeout_at(at, attempt_with_backoff(translator, &mut unit, target_language, options))
                .await
                .unwrap_or(Err(TranslationError::DeadlineExceeded))
        }
        None => attempt_with_backoff(translator, &mut unit, target_language, options).await,
    };

    unit.transition(if result.is_ok() { UnitState::Succeeded } else { UnitState::Failed });

    UnitReport {
        position: unit.position,
        attempts: unit.attempts,
        result,
    }
}

async fn attempt_with_backoff(
    translator: &dyn Translator,
    unit: &mut TranslationUnit,
    target_language: &str,
    options: &BatchOptions,
) -> Result<String, TranslationError> {
    let max_attempts = options.max_retries.max(1);

    for attempt in 0..max_attempts {
        unit.transition(UnitState::InFlight);
        unit.attempts += 1;

        let result = translator
            .translate(&unit.source_text, target_language, &unit.context.before, &unit.context.after)
            .await;

        match result {
            Ok(text) => {
                // Multi-line answers are folded so the caption block stays intact
                let text = collapse_lines(&text);
                if text.is_empty() {
                    return Err(TranslationError::EmptyResponse);
                }
                return Ok(text);
            }
            Err(e) if e.is_rate_limited() => {
                let wait = options.backoff_for(attempt);
                unit.transition(UnitState::RetryScheduled);
                debug!(
                    "Unit {} rate limited on attempt {}/{}, waiting {:?}",
                    unit.position + 1,
                    attempt + 1,
                    max_attempts,
                    wait
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(TranslationError::RetriesExhausted { attempts: max_attempts })
}
