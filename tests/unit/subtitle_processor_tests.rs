/*!
 * Tests for caption document parsing, editing and serialization
 */

use std::path::PathBuf;
use subtitler::errors::SubtitleError;
use subtitler::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use subtitler::timecode::ClockTime;
use crate::common;

fn parse(content: &str) -> SubtitleCollection {
    SubtitleCollection::from_srt_string(PathBuf::from("test.srt"), "es".to_string(), content).unwrap()
}

#[test]
fn test_parseSrtString_withValidDocument_shouldReadAllEntries() {
    let collection = parse(common::HOLA_MUNDO_ADIOS);

    assert_eq!(collection.len(), 3);
    assert_eq!(collection.texts(), vec!["Hola", "Mundo", "Adios"]);
    assert_eq!(collection.entries[1].start.to_string(), "00:00:02,000");
    assert_eq!(collection.entries[1].end.to_string(), "00:00:03,500");
}

#[test]
fn test_serialize_thenParse_shouldRoundTrip() {
    let original = parse(common::HOLA_MUNDO_ADIOS);
    let reparsed = parse(&original.to_srt_string());

    assert_eq!(reparsed.entries, original.entries);
}

#[test]
fn test_toSrtString_shouldEmitBlocksSeparatedByBlankLines() {
    let collection = parse(common::HOLA_MUNDO_ADIOS);
    assert_eq!(collection.to_srt_string(), common::HOLA_MUNDO_ADIOS);
}

#[test]
fn test_parseSrtString_withCrlfAndExtraBlankLines_shouldParse() {
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHola\r\n\r\n\r\n  \r\n2\r\n00:00:02,000 --> 00:00:03,000\r\nMundo\r\n";
    let collection = parse(content);

    assert_eq!(collection.texts(), vec!["Hola", "Mundo"]);
}

#[test]
fn test_parseSrtString_withMalformedBlocks_shouldSkipThem() {
    let content = "1
00:00:01,000 --> 00:00:02,000
Hola

2
00:00:02,000 -> 00:00:03,000
bad separator

3
only two lines

4
00:00:05,000 --> 00:00:04,000
inverted

5
00:00:06,000 --> 00:00:07,000
Adios
";
    let collection = parse(content);

    assert_eq!(collection.texts(), vec!["Hola", "Adios"]);
    assert_eq!(collection.entries[1].seq_num, 2);
}

#[test]
fn test_parseSrtString_withMultilineText_shouldJoinLines() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nfirst line\nsecond line\n";
    assert_eq!(parse(content).entries[0].text, "first line second line");
}

#[test]
fn test_parseSrtString_withOutOfOrderBlocks_shouldSortAndRenumber() {
    let content = "7\n00:00:05,000 --> 00:00:06,000\nlater\n\n3\n00:00:01,000 --> 00:00:02,000\nearlier\n";
    let collection = parse(content);

    assert_eq!(collection.texts(), vec!["earlier", "later"]);
    assert_eq!(collection.entries[0].seq_num, 1);
    assert_eq!(collection.entries[1].seq_num, 2);
}

#[test]
fn test_parseSrtString_withEmptyInput_shouldFail() {
    assert!(matches!(
        SubtitleCollection::parse_srt_string("  \n\n"),
        Err(SubtitleError::Parse(_))
    ));
}

#[test]
fn test_parseSrtString_withOnlyGarbage_shouldReturnNoEntries() {
    assert!(SubtitleCollection::parse_srt_string("not a subtitle").unwrap().is_empty());
}

#[test]
fn test_withTexts_shouldKeepTimingAndNumbering() {
    let collection = parse(common::HOLA_MUNDO_ADIOS);
    let translated = collection
        .with_texts(vec!["Hello".into(), "World".into(), "Bye".into()])
        .unwrap();

    assert_eq!(translated.texts(), vec!["Hello", "World", "Bye"]);
    for (a, b) in collection.entries.iter().zip(&translated.entries) {
        assert_eq!((a.seq_num, a.start, a.end), (b.seq_num, b.start, b.end));
    }
}

#[test]
fn test_withTexts_withWrongLength_shouldReturnLengthMismatch() {
    let collection = parse(common::HOLA_MUNDO_ADIOS);
    let err = collection.with_texts(vec!["only one".into()]).unwrap_err();

    assert_eq!(err, SubtitleError::LengthMismatch { expected: 3, actual: 1 });
}

#[test]
fn test_newValidated_shouldRejectInvertedRangeAndEmptyText() {
    let one = ClockTime::from_millis(1000);
    let two = ClockTime::from_millis(2000);

    assert!(SubtitleEntry::new_validated(1, two, one, "x").is_err());
    assert!(SubtitleEntry::new_validated(1, one, two, "   ").is_err());
    assert!(SubtitleEntry::new_validated(1, one, one, "zero duration").is_ok());
}

#[test]
fn test_writeToSrt_thenReadSrtFile_shouldRoundTrip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("nested").join("out.srt");

    let collection = parse(common::HOLA_MUNDO_ADIOS);
    collection.write_to_srt(&path).unwrap();

    let reread = SubtitleCollection::read_srt_file(&path, "es").unwrap();
    assert_eq!(reread.entries, collection.entries);
    assert_eq!(reread.source_file, path);
}
