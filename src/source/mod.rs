//! Tabular source readers for design and layout files.
//!
//! Ownership model:
//! - `DesignSource` owns the single read cursor over the hierarchical
//!   design file and yields transient per-level records.
//! - `LayoutSource` owns the cursor over the flat coordinate table.
//! - `ColumnIndex` maps identifier values to byte offsets recorded during
//!   a one-time scan, and enforces the at-most-one-match contract.
//!
//! Restarting iteration is only possible by rewinding to the first data
//! row; there is no in-place backtracking.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::constants::format;
use crate::errors::DumpError;
use crate::types::ColumnName;

pub mod design;
pub mod index;
pub mod layout;

pub use design::DesignSource;
pub use index::{ColumnIndex, UnitSite};
pub use layout::{LayoutRow, LayoutSource};

/// Buffered line reader that tracks byte offsets for index seeks.
#[derive(Debug)]
pub(crate) struct LineReader {
    reader: BufReader<File>,
    offset: u64,
    line: u64,
}

impl LineReader {
    pub(crate) fn open(path: &Path) -> io::Result<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
            offset: 0,
            line: 0,
        })
    }

    /// Read the next line, returning its starting byte offset, its line
    /// number, and its text with the trailing newline removed.
    pub(crate) fn next_line(&mut self) -> io::Result<Option<(u64, u64, String)>> {
        let mut text = String::new();
        let read = self.reader.read_line(&mut text)?;
        if read == 0 {
            return Ok(None);
        }
        let start = self.offset;
        self.offset += read as u64;
        self.line += 1;
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        Ok(Some((start, self.line, text)))
    }

    /// Current byte offset and count of lines read so far.
    pub(crate) fn position(&self) -> (u64, u64) {
        (self.offset, self.line)
    }

    /// Reposition to a byte offset recorded by an earlier scan.
    ///
    /// `line` is the number of lines preceding the offset; pass 0 when it
    /// is unknown (diagnostics will not carry a line number).
    pub(crate) fn seek_to(&mut self, offset: u64, line: u64) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(offset))?;
        self.offset = offset;
        self.line = line;
        Ok(())
    }
}

/// One parsed data line, before level-specific interpretation.
#[derive(Clone, Debug)]
pub(crate) struct RawRow {
    pub(crate) level: usize,
    pub(crate) fields: Vec<String>,
    pub(crate) offset: u64,
    pub(crate) line: u64,
}

/// Split a `#%key=value` header line into its key and value.
pub(crate) fn parse_header_entry(text: &str) -> Option<(&str, &str)> {
    text.strip_prefix(format::HEADER_PREFIX)?
        .split_once(format::HEADER_DELIMITER)
}

/// Level declared by a `headerN` key, if the key is one.
pub(crate) fn level_header_index(key: &str) -> Option<usize> {
    key.strip_prefix(format::LEVEL_HEADER_PREFIX)?
        .parse::<usize>()
        .ok()
}

/// True for lines the data section skips: blanks and `#` comments.
pub(crate) fn is_data_skippable(text: &str) -> bool {
    text.is_empty() || text.starts_with(format::COMMENT_PREFIX)
}

/// Split a header declaration value into column names.
pub(crate) fn split_columns(value: &str) -> Vec<ColumnName> {
    value
        .split(format::FIELD_DELIMITER)
        .map(str::to_string)
        .collect()
}

/// Parse a data line against the per-level schemas of its source.
///
/// The leading-tab count gives the level; the remaining text must carry
/// exactly as many fields as that level's schema declares.
pub(crate) fn parse_data_line(
    schemas: &[Vec<ColumnName>],
    source: &str,
    offset: u64,
    line: u64,
    text: &str,
) -> Result<RawRow, DumpError> {
    let level = text
        .chars()
        .take_while(|ch| *ch == format::FIELD_DELIMITER)
        .count();
    if level >= schemas.len() {
        return Err(DumpError::Malformed {
            src: source.to_string(),
            line,
            reason: format!(
                "nesting level {level} exceeds the declared {} level(s)",
                schemas.len()
            ),
        });
    }
    let fields: Vec<String> = text[level..]
        .split(format::FIELD_DELIMITER)
        .map(str::to_string)
        .collect();
    let expected = schemas[level].len();
    if fields.len() != expected {
        return Err(DumpError::Malformed {
            src: source.to_string(),
            line,
            reason: format!(
                "expected {expected} level-{level} field(s), found {}",
                fields.len()
            ),
        });
    }
    Ok(RawRow {
        level,
        fields,
        offset,
        line,
    })
}

/// Display name of an input path, used in diagnostics and the index.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse an identifier field into its integer value.
pub(crate) fn parse_id_field(
    raw: &str,
    level: usize,
    source: &str,
    line: u64,
) -> Result<i64, DumpError> {
    raw.trim().parse::<i64>().map_err(|_| DumpError::Malformed {
        src: source.to_string(),
        line,
        reason: format!("level-{level} identifier '{raw}' is not an integer"),
    })
}
