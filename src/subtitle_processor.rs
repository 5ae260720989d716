use std::fmt;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::timecode::ClockTime;

// @module: Caption document model and SRT exchange format

// @const: Blank-line block separator (whitespace-only lines count as blank)
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("block separator regex is valid")
});

// @const: Separator between start and end time
const TIME_SEPARATOR: &str = " --> ";

/// Fold a possibly multi-line text onto one line.
///
/// Each line is trimmed, empty lines are dropped and the rest are joined
/// with a single space. This is the form the parser reads caption text in,
/// so a written caption can never contain a blank line that would end its
/// block early.
pub fn collapse_lines(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number (derived, 1-based)
    pub seq_num: usize,

    // @field: Start time
    pub start: ClockTime,

    // @field: End time
    pub end: ClockTime,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry without validation
    pub fn new(seq_num: usize, start: ClockTime, end: ClockTime, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start,
            end,
            text: text.into(),
        }
    }

    // @creates: Validated subtitle entry
    // @validates: start <= end and non-empty text
    pub fn new_validated(seq_num: usize, start: ClockTime, end: ClockTime, text: &str) -> Result<Self, SubtitleError> {
        if end < start {
            return Err(SubtitleError::InvalidEntry(format!(
                "entry {}: end time {} is before start time {}",
                seq_num, end, start
            )));
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(SubtitleError::InvalidEntry(format!("entry {} has empty text", seq_num)));
        }

        Ok(SubtitleEntry {
            seq_num,
            start,
            end,
            text: trimmed_text.to_string(),
        })
    }

    /// Length of the text in characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.end.to_seconds() - self.start.to_seconds()
    }

    /// Time line as written in SRT: `start --> end`
    pub fn format_time_line(&self) -> String {
        format!("{}{}{}", self.start, TIME_SEPARATOR, self.end)
    }

    fn write_block(&self, f: &mut impl fmt::Write, index: usize) -> fmt::Result {
        writeln!(f, "{}", index)?;
        writeln!(f, "{}", self.format_time_line())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_block(f, self.seq_num)
    }
}

/// Collection of subtitle entries with metadata
///
/// Entries are kept sorted by start time and numbered 1..N after every
/// structural change.
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,

    /// Source language
    pub source_language: String,
}

impl SubtitleCollection {
    /// Create a new, empty subtitle collection
    pub fn new(source_file: PathBuf, source_language: String) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
            source_language,
        }
    }

    /// Create a collection from arbitrary entries, restoring order and numbering
    pub fn from_entries(source_file: PathBuf, source_language: String, entries: Vec<SubtitleEntry>) -> Self {
        let mut collection = SubtitleCollection {
            source_file,
            entries,
            source_language,
        };
        collection.sort_and_renumber();
        collection
    }

    /// Parse SRT content into a collection
    pub fn from_srt_string(source_file: PathBuf, source_language: String, content: &str) -> Result<Self, SubtitleError> {
        let entries = Self::parse_srt_string(content)?;
        Ok(Self::from_entries(source_file, source_language, entries))
    }

    /// Read and parse an SRT file
    pub fn read_srt_file<P: AsRef<Path>>(path: P, source_language: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        Self::from_srt_string(path.to_path_buf(), source_language.to_string(), &content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// Malformed blocks are skipped rather than failing the whole parse:
    /// fewer than three lines, a time line without exactly one `-->`
    /// separator, an unreadable timestamp or an inverted time range.
    /// Only empty input is an error.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
        let trimmed = normalized.trim();
        if trimmed.is_empty() {
            return Err(SubtitleError::Parse("input is empty".to_string()));
        }

        let mut entries = Vec::new();
        let mut skipped = 0;

        for (block_idx, block) in BLOCK_SEPARATOR.split(trimmed).enumerate() {
            match Self::parse_block(block, entries.len() + 1) {
                Some(entry) => entries.push(entry),
                None => {
                    skipped += 1;
                    debug!("Skipping malformed subtitle block {}: {:?}", block_idx + 1, block);
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} malformed subtitle block(s)", skipped);
        }

        // Sort by start time to ensure correct order
        entries.sort_by_key(|entry| entry.start);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }

        Ok(entries)
    }

    fn parse_block(block: &str, seq_num: usize) -> Option<SubtitleEntry> {
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 {
            return None;
        }

        let parts: Vec<&str> = lines[1].trim().split(TIME_SEPARATOR).collect();
        if parts.len() != 2 {
            return None;
        }

        let start = ClockTime::parse(parts[0].trim()).ok()?;
        let end = ClockTime::parse(parts[1].trim()).ok()?;

        let text = collapse_lines(&lines[2..].join("\n"));

        match SubtitleEntry::new_validated(seq_num, start, end, &text) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping invalid subtitle block: {}", e);
                None
            }
        }
    }

    /// Serialize to SRT, numbering entries 1..N in their current order
    pub fn to_srt_string(&self) -> String {
        let mut output = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            // Writing into a String cannot fail
            let _ = entry.write_block(&mut output, i + 1);
        }
        output
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        FileManager::write_to_file(path, &self.to_srt_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }

    /// Copy of this collection with each caption's text replaced by position
    ///
    /// Timing, order and numbering are kept exactly as they are. Line breaks
    /// inside a text are folded with [`collapse_lines`].
    pub fn with_texts(&self, texts: Vec<String>) -> Result<Self, SubtitleError> {
        if texts.len() != self.entries.len() {
            return Err(SubtitleError::LengthMismatch {
                expected: self.entries.len(),
                actual: texts.len(),
            });
        }

        let entries = self.entries
            .iter()
            .zip(texts)
            .map(|(entry, text)| SubtitleEntry {
                text: collapse_lines(&text),
                ..entry.clone()
            })
            .collect();

        Ok(SubtitleCollection {
            source_file: self.source_file.clone(),
            entries,
            source_language: self.source_language.clone(),
        })
    }

    /// Stable sort by start time and assign sequence numbers 1..N
    pub fn sort_and_renumber(&mut self) {
        self.entries.sort_by_key(|entry| entry.start);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }
    }

    /// Texts of all entries in order
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Language: {}", self.source_language)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
