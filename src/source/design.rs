//! Streaming reader for the three-level hierarchical design file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::design;
use crate::data::{ElementRecord, GroupRecord, UnitRecord};
use crate::errors::DumpError;
use crate::source::index::{ColumnIndex, UnitSite};
use crate::source::{
    LineReader, RawRow, display_name, is_data_skippable, level_header_index, parse_data_line,
    parse_header_entry, parse_id_field, split_columns,
};
use crate::types::{ColumnName, HeaderKey, HeaderValue, SourceName};

/// Number of nesting levels in a design file.
pub const LEVEL_COUNT: usize = 3;

/// Open design file: parsed headers plus a single streaming read cursor.
///
/// The cursor advances monotonically through `next_group`, `next_element`,
/// and `next_unit`; indexed reads reposition it, so a run uses either the
/// streaming walk or indexed lookups, never both interleaved.
#[derive(Debug)]
pub struct DesignSource {
    path: PathBuf,
    source_name: SourceName,
    reader: LineReader,
    metadata: Vec<(HeaderKey, HeaderValue)>,
    schemas: [Vec<ColumnName>; LEVEL_COUNT],
    data_start: u64,
    data_start_line: u64,
    pending: Option<RawRow>,
    seen_group: bool,
    element_open: bool,
}

impl DesignSource {
    /// Open a design file and parse its header section.
    ///
    /// All three `#%headerN` declarations are required. Non-header metadata
    /// lines are kept in file order for preamble propagation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DumpError> {
        let path = path.as_ref().to_path_buf();
        let source_name = display_name(&path);
        let mut reader = LineReader::open(&path).map_err(|err| DumpError::Open {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

        let mut metadata = Vec::new();
        let mut declared: [Option<Vec<ColumnName>>; LEVEL_COUNT] = [None, None, None];
        let mut first_data: Option<(u64, u64, String)> = None;
        while let Some((offset, line, text)) = reader.next_line()? {
            if text.is_empty() {
                continue;
            }
            if let Some((key, value)) = parse_header_entry(&text) {
                match level_header_index(key) {
                    Some(level) if level < LEVEL_COUNT => {
                        declared[level] = Some(split_columns(value));
                    }
                    Some(level) => {
                        return Err(DumpError::Malformed {
                            src: source_name,
                            line,
                            reason: format!("unexpected level-{level} header declaration"),
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

        let mut schemas: [Vec<ColumnName>; LEVEL_COUNT] = [Vec::new(), Vec::new(), Vec::new()];
        for (level, columns) in declared.into_iter().enumerate() {
            schemas[level] = columns.ok_or_else(|| DumpError::Malformed {
                src: source_name.clone(),
                line: 0,
                reason: format!("missing #%header{level} declaration"),
            })?;
        }

        let (data_start, data_start_line) = match &first_data {
            Some((offset, line, _)) => (*offset, line - 1),
            None => reader.position(),
        };
        debug!(
            source = %source_name,
            groups_schema = schemas[0].len(),
            "opened design file"
        );

        let mut source = Self {
            path,
            source_name,
            reader,
            metadata,
            schemas,
            data_start,
            data_start_line,
            pending: None,
            seen_group: false,
            element_open: false,
        };
        if let Some((offset, line, text)) = first_data {
            source.pending = Some(parse_data_line(
                &source.schemas,
                &source.source_name,
                offset,
                line,
                &text,
            )?);
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

    /// Header metadata entries, in file order, excluding `headerN` keys.
    pub fn metadata(&self) -> &[(HeaderKey, HeaderValue)] {
        &self.metadata
    }

    /// Declared column names for `level` (0, 1, or 2).
    pub fn schema(&self, level: usize) -> &[ColumnName] {
        &self.schemas[level]
    }

    /// Reposition the cursor to the first data row.
    pub fn rewind(&mut self) -> Result<(), DumpError> {
        self.reader.seek_to(self.data_start, self.data_start_line)?;
        self.pending = None;
        self.seen_group = false;
        self.element_open = false;
        Ok(())
    }

    /// Advance to the next level-0 row, skipping nested rows in between.
    ///
    /// Nested rows appearing before the first group row are malformed.
    pub fn next_group(&mut self) -> Result<Option<GroupRecord>, DumpError> {
        loop {
            let Some(row) = self.take_raw()? else {
                return Ok(None);
            };
            if row.level == 0 {
                self.seen_group = true;
                self.element_open = false;
                return self.group_record(row).map(Some);
            }
            if !self.seen_group {
                return Err(self.malformed(row.line, "nested row before any group row"));
            }
        }
    }

    /// Advance to the next level-1 row of the current group.
    ///
    /// Returns `None` at the next group row or end of file, leaving the
    /// cursor positioned for the following `next_group` call. Unit rows
    /// left undrained by the caller are skipped.
    pub fn next_element(&mut self) -> Result<Option<ElementRecord>, DumpError> {
        loop {
            let Some(row) = self.take_raw()? else {
                return Ok(None);
            };
            match row.level {
                0 => {
                    self.pending = Some(row);
                    return Ok(None);
                }
                1 => {
                    self.element_open = true;
                    return Ok(Some(ElementRecord { fields: row.fields }));
                }
                _ => {
                    if !self.element_open {
                        return Err(self.malformed(row.line, "unit row outside an element"));
                    }
                }
            }
        }
    }

    /// Advance to the next level-2 row of the current element.
    ///
    /// Returns `None` at the next group or element row or end of file.
    pub fn next_unit(&mut self) -> Result<Option<UnitRecord>, DumpError> {
        let Some(row) = self.take_raw()? else {
            return Ok(None);
        };
        if row.level == 2 {
            return self.unit_record(row).map(Some);
        }
        self.pending = Some(row);
        Ok(None)
    }

    /// Scan the whole file once, indexing group ids by byte offset.
    ///
    /// The cursor is rewound before and after the scan.
    pub fn build_group_index(&mut self) -> Result<ColumnIndex<u64>, DumpError> {
        self.rewind()?;
        let mut index = ColumnIndex::new(design::GROUP_ID_COLUMN, self.source_name.clone());
        while let Some(row) = self.take_raw()? {
            if row.level == 0 {
                let id = self.row_id(&row)?;
                index.insert(id, row.offset);
            }
        }
        self.rewind()?;
        debug!(keys = index.len(), "indexed groups in design file");
        Ok(index)
    }

    /// Scan the whole file once, indexing unit ids with their owning rows.
    ///
    /// The cursor is rewound before and after the scan.
    pub fn build_unit_index(&mut self) -> Result<ColumnIndex<UnitSite>, DumpError> {
        self.rewind()?;
        let mut index = ColumnIndex::new(design::UNIT_ID_COLUMN, self.source_name.clone());
        let mut group_offset: Option<u64> = None;
        let mut element_offset: Option<u64> = None;
        while let Some(row) = self.take_raw()? {
            match row.level {
                0 => {
                    group_offset = Some(row.offset);
                    element_offset = None;
                }
                1 => {
                    if group_offset.is_none() {
                        return Err(self.malformed(row.line, "element row before any group row"));
                    }
                    element_offset = Some(row.offset);
                }
                _ => {
                    let (Some(group), Some(element)) = (group_offset, element_offset) else {
                        return Err(self.malformed(row.line, "unit row outside an element"));
                    };
                    let id = self.row_id(&row)?;
                    index.insert(
                        id,
                        UnitSite {
                            group,
                            element,
                            unit: row.offset,
                        },
                    );
                }
            }
        }
        self.rewind()?;
        debug!(keys = index.len(), "indexed units in design file");
        Ok(index)
    }

    /// Read the group row at an indexed offset and leave the cursor on its
    /// children, ready for `next_element`.
    pub fn read_group_at(&mut self, offset: u64) -> Result<GroupRecord, DumpError> {
        self.seek_row(offset)?;
        match self.take_raw()? {
            Some(row) if row.level == 0 => {
                self.seen_group = true;
                self.element_open = false;
                self.group_record(row)
            }
            _ => Err(self.malformed(0, "indexed offset does not address a group row")),
        }
    }

    /// Read the unit row at an indexed site together with its owners.
    pub fn read_unit_site(
        &mut self,
        site: UnitSite,
    ) -> Result<(GroupRecord, ElementRecord, UnitRecord), DumpError> {
        let group = self.read_group_at(site.group)?;
        self.seek_row(site.element)?;
        let element = match self.take_raw()? {
            Some(row) if row.level == 1 => ElementRecord { fields: row.fields },
            _ => return Err(self.malformed(0, "indexed offset does not address an element row")),
        };
        self.seek_row(site.unit)?;
        let unit = match self.take_raw()? {
            Some(row) if row.level == 2 => self.unit_record(row)?,
            _ => return Err(self.malformed(0, "indexed offset does not address a unit row")),
        };
        Ok((group, element, unit))
    }

    fn seek_row(&mut self, offset: u64) -> Result<(), DumpError> {
        self.reader.seek_to(offset, 0)?;
        self.pending = None;
        Ok(())
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
            return parse_data_line(&self.schemas, &self.source_name, offset, line, &text).map(Some);
        }
    }

    fn group_record(&self, row: RawRow) -> Result<GroupRecord, DumpError> {
        let mut fields = row.fields;
        let raw_id = fields.remove(0);
        let id = parse_id_field(&raw_id, 0, &self.source_name, row.line)?;
        Ok(GroupRecord { id, fields })
    }

    fn unit_record(&self, row: RawRow) -> Result<UnitRecord, DumpError> {
        let mut fields = row.fields;
        let raw_id = fields.remove(0);
        let id = parse_id_field(&raw_id, 2, &self.source_name, row.line)?;
        Ok(UnitRecord { id, fields })
    }

    fn row_id(&self, row: &RawRow) -> Result<i64, DumpError> {
        parse_id_field(&row.fields[0], row.level, &self.source_name, row.line)
    }

    fn malformed(&self, line: u64, reason: &str) -> DumpError {
        DumpError::Malformed {
            src: self.source_name.clone(),
            line,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::path::PathBuf;

    const SMALL_DESIGN: &str = "\
#%design_format_version=1.0
#%design_type=grid-3k
#%header0=group_id\ttype\tname
#%header1=element_id
#%header2=unit_id\tlength
5\tmain->v1\talpha
\t50
\t\t501\t25
\t\t502\t26
9\tmain->rescue->v1\tbeta
\t90
\t\t901\t30
";

    fn write_design(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("chip.design");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn open_parses_headers_and_schemas() {
        let dir = tempfile::tempdir().unwrap();
        let source = DesignSource::open(write_design(&dir, SMALL_DESIGN)).unwrap();
        assert_eq!(source.schema(0), ["group_id", "type", "name"]);
        assert_eq!(source.schema(1), ["element_id"]);
        assert_eq!(source.schema(2), ["unit_id", "length"]);
        assert_eq!(
            source.metadata(),
            [
                (
                    "design_format_version".to_string(),
                    "1.0".to_string()
                ),
                ("design_type".to_string(), "grid-3k".to_string()),
            ]
        );
        assert_eq!(source.source_name(), "chip.design");
    }

    #[test]
    fn streaming_cursor_walks_the_hierarchy_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = DesignSource::open(write_design(&dir, SMALL_DESIGN)).unwrap();

        let first = source.next_group().unwrap().unwrap();
        assert_eq!(first.id, 5);
        assert_eq!(first.fields, ["main->v1", "alpha"]);

        let element = source.next_element().unwrap().unwrap();
        assert_eq!(element.fields, ["50"]);
        let unit = source.next_unit().unwrap().unwrap();
        assert_eq!((unit.id, unit.fields.as_slice()), (501, &["25".to_string()][..]));
        let unit = source.next_unit().unwrap().unwrap();
        assert_eq!(unit.id, 502);
        assert!(source.next_unit().unwrap().is_none());
        assert!(source.next_element().unwrap().is_none());

        let second = source.next_group().unwrap().unwrap();
        assert_eq!(second.id, 9);
        assert!(source.next_group().unwrap().is_none());
    }

    #[test]
    fn next_group_skips_undrained_children() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = DesignSource::open(write_design(&dir, SMALL_DESIGN)).unwrap();
        assert_eq!(source.next_group().unwrap().unwrap().id, 5);
        assert_eq!(source.next_group().unwrap().unwrap().id, 9);
        assert!(source.next_group().unwrap().is_none());
    }

    #[test]
    fn rewind_restarts_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = DesignSource::open(write_design(&dir, SMALL_DESIGN)).unwrap();
        assert_eq!(source.next_group().unwrap().unwrap().id, 5);
        source.rewind().unwrap();
        assert_eq!(source.next_group().unwrap().unwrap().id, 5);
    }

    #[test]
    fn group_index_addresses_groups_with_children_intact() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = DesignSource::open(write_design(&dir, SMALL_DESIGN)).unwrap();
        let index = source.build_group_index().unwrap();
        let offset = *index.at_most_one(9).unwrap().unwrap();
        let group = source.read_group_at(offset).unwrap();
        assert_eq!(group.id, 9);
        let element = source.next_element().unwrap().unwrap();
        assert_eq!(element.fields, ["90"]);
        assert_eq!(source.next_unit().unwrap().unwrap().id, 901);
    }

    #[test]
    fn unit_index_recovers_the_owning_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = DesignSource::open(write_design(&dir, SMALL_DESIGN)).unwrap();
        let index = source.build_unit_index().unwrap();
        let site = *index.at_most_one(502).unwrap().unwrap();
        let (group, element, unit) = source.read_unit_site(site).unwrap();
        assert_eq!(group.id, 5);
        assert_eq!(element.fields, ["50"]);
        assert_eq!(unit.id, 502);
        assert_eq!(unit.fields, ["26"]);
        assert!(index.at_most_one(999).unwrap().is_none());
    }

    #[test]
    fn missing_level_header_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let content = "#%header0=group_id\tname\n#%header1=element_id\n1\talpha\n";
        let err = DesignSource::open(write_design(&dir, content)).unwrap_err();
        assert!(matches!(err, DumpError::Malformed { .. }));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let content = "\
#%header0=group_id\tname
#%header1=element_id
#%header2=unit_id
1\talpha\textra
";
        let err = DesignSource::open(write_design(&dir, content)).unwrap_err();
        assert!(matches!(err, DumpError::Malformed { .. }));
    }

    #[test]
    fn nested_row_before_any_group_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let content = "\
#%header0=group_id\tname
#%header1=element_id
#%header2=unit_id
\t50
1\talpha
";
        let mut source = DesignSource::open(write_design(&dir, content)).unwrap();
        let err = source.next_group().unwrap_err();
        assert!(matches!(err, DumpError::Malformed { .. }));
    }

    #[test]
    fn empty_data_section_yields_no_groups() {
        let dir = tempfile::tempdir().unwrap();
        let content = "#%header0=group_id\n#%header1=element_id\n#%header2=unit_id\n";
        let mut source = DesignSource::open(write_design(&dir, content)).unwrap();
        assert!(source.next_group().unwrap().is_none());
    }
}
