/*!
 * Transcript ingestion.
 *
 * Speech-to-text runs outside this crate. Whatever produces the transcript
 * only has to hand back timed segments; this module turns them into a
 * caption document. Segments deserialize directly from Whisper's
 * `verbose_json` output.
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::timecode::ClockTime;

/// One timed piece of transcribed speech, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Transcription output as written by Whisper-style tools
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Verbose { segments: Vec<TranscriptSegment> },
    Plain(Vec<TranscriptSegment>),
}

/// External speech-to-text capability.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio file or chunk into segments relative to its start.
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<TranscriptSegment>>;
}

/// Parse segments from a JSON transcript (`{"segments": [...]}` or a bare array).
pub fn parse_segments_json(content: &str) -> Result<Vec<TranscriptSegment>> {
    let file: TranscriptFile = serde_json::from_str(content)
        .context("Failed to parse transcript JSON")?;

    Ok(match file {
        TranscriptFile::Verbose { segments } => segments,
        TranscriptFile::Plain(segments) => segments,
    })
}

/// Read segments from a JSON transcript file.
pub fn read_segments_file<P: AsRef<Path>>(path: P) -> Result<Vec<TranscriptSegment>> {
    let content = FileManager::read_to_string(&path)?;
    parse_segments_json(&content)
        .with_context(|| format!("Invalid transcript file: {}", path.as_ref().display()))
}

impl SubtitleCollection {
    /// Build a caption document from transcript segments.
    ///
    /// `offset_secs` is added to every segment, for transcripts produced
    /// chunk by chunk. Text is trimmed, segments without text are dropped and
    /// an end before the start is pulled up to the start.
    pub fn from_segments(
        source_file: PathBuf,
        source_language: String,
        segments: &[TranscriptSegment],
        offset_secs: f64,
    ) -> Self {
        let entries: Vec<SubtitleEntry> = segments
            .iter()
            .filter_map(|segment| {
                let text = segment.text.trim();
                if text.is_empty() {
                    debug!("Dropping empty transcript segment at {:.3}s", segment.start);
                    return None;
                }

                let start = ClockTime::from_seconds(segment.start + offset_secs);
                let end = ClockTime::from_seconds(segment.end + offset_secs).max(start);
                Some(SubtitleEntry::new(0, start, end, text))
            })
            .collect();

        SubtitleCollection::from_entries(source_file, source_language, entries)
    }
}
