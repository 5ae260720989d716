/*!
 * Readability segmentation for captions.
 *
 * Captions whose text exceeds a character budget are split once, at the
 * middle word, with the time span cut at its temporal midpoint. Splitting is
 * a single level: pieces are not re-checked against the budget.
 */

use log::debug;

use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::timecode::ClockTime;

/// Default character budget per caption
pub const DEFAULT_MAX_CHARS: usize = 140;

/// Split a caption that is longer than `max_chars` into two pieces.
///
/// Returns the caption unchanged when it fits, or when it has fewer than two
/// words and so has no word boundary to split at. Pieces carry the source
/// sequence number until the document is renumbered.
pub fn split_oversized(entry: &SubtitleEntry, max_chars: usize) -> Vec<SubtitleEntry> {
    if entry.char_count() <= max_chars {
        return vec![entry.clone()];
    }

    let words: Vec<&str> = entry.text.split_whitespace().collect();
    // Kept whole rather than split into an empty piece plus the word, which would not survive a round trip
    if words.len() < 2 {
        debug!(
            "Entry {} exceeds {} chars but has no word boundary, leaving as is",
            entry.seq_num, max_chars
        );
        return vec![entry.clone()];
    }

    let half = words.len() / 2;
    let first_text = words[..half].join(" ");
    let second_text = words[half..].join(" ");

    let mid = ClockTime::from_seconds((entry.start.to_seconds() + entry.end.to_seconds()) / 2.0);
    // Rounding the midpoint can never leave the original span
    let mid = mid.clamp(entry.start, entry.end);

    vec![
        SubtitleEntry::new(entry.seq_num, entry.start, mid, first_text),
        SubtitleEntry::new(entry.seq_num, mid, entry.end, second_text),
    ]
}

/// Split every oversized caption, then sort by start time and renumber.
pub fn normalize(collection: &SubtitleCollection, max_chars: usize) -> SubtitleCollection {
    let entries: Vec<SubtitleEntry> = collection
        .entries
        .iter()
        .flat_map(|entry| split_oversized(entry, max_chars))
        .collect();

    let added = entries.len() - collection.entries.len();
    if added > 0 {
        debug!("Split {} oversized caption(s) at {} chars", added, max_chars);
    }

    SubtitleCollection::from_entries(
        collection.source_file.clone(),
        collection.source_language.clone(),
        entries,
    )
}
