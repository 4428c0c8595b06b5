//! Reader for the flat unit-coordinate layout file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::layout;
use crate::data::UnitPoint;
use crate::errors::DumpError;
use crate::source::index::ColumnIndex;
use crate::source::{
    LineReader, RawRow, display_name, is_data_skippable, level_header_index, parse_data_line,
    parse_header_entry, parse_id_field, split_columns,
};
use crate::types::{ColumnName, HeaderKey, HeaderValue, SourceName, UnitId};

/// One layout data row: unit identifier plus its remaining fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutRow {
    /// Identifier parsed from the first column.
    pub id: UnitId,
    /// Remaining field values, in schema order.
    pub fields: Vec<String>,
}

/// Open layout file: parsed header plus a streaming read cursor.
#[derive(Debug)]
pub struct LayoutSource {
    path: PathBuf,
    source_name: SourceName,
    reader: LineReader,
    metadata: Vec<(HeaderKey, HeaderValue)>,
    schema: Vec<ColumnName>,
    data_start: u64,
    data_start_line: u64,
    pending: Option<RawRow>,
}

impl LayoutSource {
    /// Open a layout file and parse its header section.
    ///
    /// `#%header0` is required and its first column must be `unit_id`;
    /// nested level declarations are rejected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DumpError> {
        let path = path.as_ref().to_path_buf();
        let source_name = display_name(&path);
        let mut reader = LineReader::open(&path).map_err(|err| DumpError::Open {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

        let mut metadata = Vec::new();
        let mut schema: Option<Vec<ColumnName>> = None;
        let mut first_data: Option<(u64, u64, String)> = None;
        while let Some((offset, line, text)) = reader.next_line()? {
            if text.is_empty() {
                continue;
            }
            if let Some((key, value)) = parse_header_entry(&text) {
                match level_header_index(key) {
                    Some(0) => schema = Some(split_columns(value)),
                    Some(level) => {
                        return Err(DumpError::Malformed {
                            src: source_name,
                            line,
                            reason: format!(
                                "layout file declares a nested level-{level} header"
                            ),
                        });
                    }
                    None => metadata.push((key.to_string(), value.to_string())),
                }
                continue;
            }
            if is_data_skippable(&text) {
                continue;
            }
            first_data = Some((offset, line, text));
            break;
        }

        let schema = schema.ok_or_else(|| DumpError::Malformed {
            src: source_name.clone(),
            line: 0,
            reason: "missing #%header0 declaration".to_string(),
        })?;
        if schema.first().map(String::as_str) != Some(layout::UNIT_ID_COLUMN) {
            return Err(DumpError::Schema {
                src: source_name,
                reason: format!(
                    "'{}' must be the first layout column",
                    layout::UNIT_ID_COLUMN
                ),
            });
        }

        let (data_start, data_start_line) = match &first_data {
            Some((offset, line, _)) => (*offset, line - 1),
            None => reader.position(),
        };
        debug!(source = %source_name, columns = schema.len(), "opened layout file");

        let mut source = Self {
            path,
            source_name,
            reader,
            metadata,
            schema,
            data_start,
            data_start_line,
            pending: None,
        };
        if let Some((offset, line, text)) = first_data {
            source.pending = Some(source.parse_row(offset, line, &text)?);
        }
        Ok(source)
    }

    /// Display name used in diagnostics.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared column names.
    pub fn schema(&self) -> &[ColumnName] {
        &self.schema
    }

    /// Value of a `#%key=value` header entry, if present.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Position of `name` among the columns after `unit_id`.
    pub fn column_slot(&self, name: &str) -> Option<usize> {
        self.schema.iter().skip(1).position(|column| column == name)
    }

    /// Reposition the cursor to the first data row.
    pub fn rewind(&mut self) -> Result<(), DumpError> {
        self.reader.seek_to(self.data_start, self.data_start_line)?;
        self.pending = None;
        Ok(())
    }

    /// Read the next data row.
    pub fn next_row(&mut self) -> Result<Option<LayoutRow>, DumpError> {
        let Some(row) = self.take_raw()? else {
            return Ok(None);
        };
        let mut fields = row.fields;
        let raw_id = fields.remove(0);
        let id = parse_id_field(&raw_id, 0, &self.source_name, row.line)?;
        Ok(Some(LayoutRow { id, fields }))
    }

    /// Scan the whole file once, indexing unit ids by byte offset.
    ///
    /// The cursor is rewound before and after the scan.
    pub fn build_unit_index(&mut self) -> Result<ColumnIndex<u64>, DumpError> {
        self.rewind()?;
        let mut index = ColumnIndex::new(layout::UNIT_ID_COLUMN, self.source_name.clone());
        while let Some(row) = self.take_raw()? {
            let id = parse_id_field(&row.fields[0], 0, &self.source_name, row.line)?;
            index.insert(id, row.offset);
        }
        self.rewind()?;
        debug!(keys = index.len(), "indexed units in layout file");
        Ok(index)
    }

    /// Read the coordinates of the row at an indexed offset.
    ///
    /// `x_slot` and `y_slot` are positions among the columns after
    /// `unit_id`, as returned by `column_slot`.
    pub fn read_point_at(
        &mut self,
        offset: u64,
        x_slot: usize,
        y_slot: usize,
    ) -> Result<UnitPoint, DumpError> {
        self.reader.seek_to(offset, 0)?;
        self.pending = None;
        let Some(row) = self.take_raw()? else {
            return Err(DumpError::Malformed {
                src: self.source_name.clone(),
                line: 0,
                reason: "indexed offset does not address a layout row".to_string(),
            });
        };
        let x = self.coordinate_field(&row, x_slot, layout::X_COLUMN)?;
        let y = self.coordinate_field(&row, y_slot, layout::Y_COLUMN)?;
        Ok(UnitPoint { x, y })
    }

    fn coordinate_field(
        &self,
        row: &RawRow,
        slot: usize,
        name: &str,
    ) -> Result<i64, DumpError> {
        let raw = &row.fields[slot + 1];
        raw.trim().parse::<i64>().map_err(|_| DumpError::Malformed {
            src: self.source_name.clone(),
            line: row.line,
            reason: format!("'{name}' value '{raw}' is not an integer"),
        })
    }

    fn take_raw(&mut self) -> Result<Option<RawRow>, DumpError> {
        if let Some(row) = self.pending.take() {
            return Ok(Some(row));
        }
        loop {
            let Some((offset, line, text)) = self.reader.next_line()? else {
                return Ok(None);
            };
            if is_data_skippable(&text) {
                continue;
            }
            return self.parse_row(offset, line, &text).map(Some);
        }
    }

    fn parse_row(&self, offset: u64, line: u64, text: &str) -> Result<RawRow, DumpError> {
        parse_data_line(
            std::slice::from_ref(&self.schema),
            &self.source_name,
            offset,
            line,
            text,
        )
    }
}
