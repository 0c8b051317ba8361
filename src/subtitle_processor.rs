use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: SRT document model - parsing, serialization, renumbering

// @const: Canonical SRT timecode shape, used only for advisory validation.
// Timecodes are carried as opaque strings and never converted to numbers,
// so an unusual shape is a warning rather than a parse failure.
static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3}$").unwrap()
});

/// The ` --> ` separator between the start and end timecodes
const TIMECODE_SEPARATOR: &str = " --> ";

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number (unique only within one document)
    pub seq_num: usize,

    // @field: Start timecode, opaque, passed through unmodified
    pub start_time: String,

    // @field: End timecode, opaque, passed through unmodified
    pub end_time: String,

    // @field: Subtitle text, possibly multi-line
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(
        seq_num: usize,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        SubtitleEntry {
            seq_num,
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
        }
    }

    /// Byte length of this entry in serialized form, including the blank
    /// line that separates it from the next entry. Computed without
    /// allocating, since the chunk planner calls this per entry.
    pub fn serialized_len(&self) -> usize {
        let seq_digits = if self.seq_num == 0 {
            1
        } else {
            (self.seq_num.ilog10() + 1) as usize
        };
        seq_digits
            + 1 // newline after the sequence number
            + self.start_time.len()
            + TIMECODE_SEPARATOR.len()
            + self.end_time.len()
            + 1 // newline after the timecode line
            + self.text.len()
            + 2 // trailing newline plus the blank separator line
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{}{}{}", self.start_time, TIMECODE_SEPARATOR, self.end_time)?;
        writeln!(f, "{}", self.text)
    }
}

/// Serialize a sequence of entries to SRT text.
///
/// Each entry is `seq\nstart --> end\ntext\n`, entries are joined with a
/// blank line. Does not depend on sequence numbers being contiguous; the
/// large-document pipeline renumbers separately.
pub fn serialize_entries(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collection of subtitle entries tied to a source file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries, in source order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        let entries = Self::parse_srt_string(&content)?;
        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse SRT text into subtitle entries.
    ///
    /// Groups consecutive non-blank lines into blocks; each block must be
    /// a sequence number line, a `start --> end` timecode line, and zero
    /// or more text lines. Parsing fails fast on the first malformed
    /// block: skipping a bad block would silently drop a subtitle from
    /// the translated output. `MalformedDocument` line numbers are
    /// 1-based positions in the input, counted across blank lines too.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let normalized = content.replace("\r\n", "\n");

        let mut entries = Vec::new();
        let mut block: Vec<&str> = Vec::new();
        let mut block_start_line = 0usize;

        for (idx, line) in normalized.lines().enumerate() {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    entries.push(Self::parse_block(&block, block_start_line)?);
                    block.clear();
                }
            } else {
                if block.is_empty() {
                    block_start_line = idx + 1;
                }
                block.push(line);
            }
        }
        if !block.is_empty() {
            entries.push(Self::parse_block(&block, block_start_line)?);
        }

        if entries.is_empty() {
            return Err(SubtitleError::EmptyDocument);
        }

        Ok(entries)
    }

    /// Parse one blank-line-delimited block, `start_line` being the
    /// 1-based input line of its first line
    fn parse_block(lines: &[&str], start_line: usize) -> Result<SubtitleEntry, SubtitleError> {
        let seq_line = lines.first().copied().unwrap_or_default().trim();
        let Some(time_line) = lines.get(1) else {
            return Err(SubtitleError::MalformedDocument {
                line: start_line,
                reason: format!("block has fewer than 2 lines: {:?}", lines.join("\n")),
            });
        };

        let seq_num: usize = seq_line.parse().map_err(|_| {
            SubtitleError::MalformedDocument {
                line: start_line,
                reason: format!("expected a sequence number, found {:?}", seq_line),
            }
        })?;

        let Some((start_time, end_time)) = time_line.trim().split_once(TIMECODE_SEPARATOR)
        else {
            return Err(SubtitleError::MalformedDocument {
                line: start_line + 1,
                reason: format!("timecode line lacks ' --> ' separator: {:?}", time_line),
            });
        };

        // Advisory only - timecodes stay opaque strings either way
        if !TIMECODE_REGEX.is_match(start_time) || !TIMECODE_REGEX.is_match(end_time) {
            warn!(
                "Entry {} has a non-standard timecode: {} --> {}",
                seq_num, start_time, end_time
            );
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            text: lines[2..].join("\n"),
        })
    }

    /// Serialize the collection to SRT text
    pub fn to_srt_string(&self) -> String {
        serialize_entries(&self.entries)
    }

    /// Renumber entries sequentially starting at 1. Used after chunk
    /// reassembly, where per-chunk numbering is meaningless.
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }
    }

    /// Write the collection to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
        file.write_all(self.to_srt_string().as_bytes())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
