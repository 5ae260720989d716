/*!
 * Neighbouring-caption context for translation.
 *
 * Each caption is translated together with the source text of up to
 * `window_size` captions before and after it. Windows are taken from the
 * untranslated document, so the result never depends on the order in which
 * other captions finish.
 */

use crate::subtitle_processor::SubtitleCollection;

/// Source texts surrounding one caption
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextWindow {
    /// Preceding captions, oldest first
    pub before: Vec<String>,
    /// Following captions, nearest first
    pub after: Vec<String>,
}

impl ContextWindow {
    /// Build the window around `position`, clamped at both document ends.
    pub fn build(collection: &SubtitleCollection, position: usize, window_size: usize) -> Self {
        let entries = &collection.entries;
        if position >= entries.len() {
            return Self::default();
        }

        let start = position.saturating_sub(window_size);
        let end = (position + 1 + window_size).min(entries.len());

        Self {
            before: entries[start..position].iter().map(|e| e.text.clone()).collect(),
            after: entries[position + 1..end].iter().map(|e| e.text.clone()).collect(),
        }
    }

    /// Build the window for every caption in document order
    pub fn build_all(collection: &SubtitleCollection, window_size: usize) -> Vec<Self> {
        (0..collection.len())
            .map(|position| Self::build(collection, position, window_size))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}
