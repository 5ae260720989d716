/*!
 * Tests for readability splitting
 */

use subtitler::segmentation::{self, DEFAULT_MAX_CHARS};
use subtitler::subtitle_processor::SubtitleEntry;
use subtitler::timecode::ClockTime;
use crate::common;

fn long_entry(words: usize) -> SubtitleEntry {
    let text: Vec<String> = (0..words).map(|i| format!("palabra{}", i)).collect();
    SubtitleEntry::new(1, ClockTime::from_millis(10_000), ClockTime::from_millis(16_000), text.join(" "))
}

#[test]
fn test_splitOversized_shouldConserveWordsAndSpan() {
    for words in [2, 3, 17, 40] {
        let entry = long_entry(words);
        let pieces = segmentation::split_oversized(&entry, 10);

        let rejoined = pieces.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, entry.text);
        assert_eq!(pieces.first().unwrap().start, entry.start);
        assert_eq!(pieces.last().unwrap().end, entry.end);
        assert_eq!(pieces[0].end, pieces[1].start);
    }
}

#[test]
fn test_splitOversized_withDefaultLimit_shouldLeaveShortCaptionAlone() {
    let entry = SubtitleEntry::new(1, ClockTime::ZERO, ClockTime::from_millis(900), "Hola");
    assert_eq!(segmentation::split_oversized(&entry, DEFAULT_MAX_CHARS), vec![entry]);
}

#[test]
fn test_splitOversized_atExactLimit_shouldNotSplit() {
    let text = "a".repeat(69) + " " + &"b".repeat(70);
    assert_eq!(text.chars().count(), DEFAULT_MAX_CHARS);

    let entry = SubtitleEntry::new(1, ClockTime::ZERO, ClockTime::from_millis(3000), text);
    assert_eq!(segmentation::split_oversized(&entry, DEFAULT_MAX_CHARS).len(), 1);
}

#[test]
fn test_normalize_withNothingOversized_shouldBeIdentity() {
    let collection = common::collection_from_texts(&["Hola", "Mundo", "Adios"]);
    let normalized = segmentation::normalize(&collection, DEFAULT_MAX_CHARS);

    assert_eq!(normalized.entries, collection.entries);
}

#[test]
fn test_normalize_shouldBeIdempotentAfterOnePass() {
    let collection = common::collection_from_texts(&["uno dos tres cuatro", "cinco"]);
    let once = segmentation::normalize(&collection, 12);
    let twice = segmentation::normalize(&once, 12);

    assert_eq!(once.entries, twice.entries);
    assert_eq!(once.len(), 3);
}
