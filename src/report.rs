//! Report assembly: metadata preamble, header line, and denormalized rows.

use std::io::Write;

use chrono::Local;

use crate::catalog::Catalog;
use crate::constants::{design, format, report};
use crate::coords::CoordinateResolver;
use crate::data::{ElementRecord, GroupRecord, UnitRecord};
use crate::errors::DumpError;
use crate::metadata::MetadataKey;
use crate::runid;
use crate::source::DesignSource;
use crate::types::{HeaderKey, HeaderValue};

/// Streaming writer of the tab-delimited report.
///
/// Holds at most one group's nested state at a time: unit rows are written
/// as the cursor produces them, so memory use tracks schema width, not
/// source size.
pub struct ReportWriter<W: Write> {
    out: W,
    catalog: Catalog,
    resolver: Option<CoordinateResolver>,
}

impl<W: Write> ReportWriter<W> {
    /// Create a writer emitting through `out` with the given bindings.
    pub fn new(out: W, catalog: Catalog, resolver: Option<CoordinateResolver>) -> Self {
        Self {
            out,
            catalog,
            resolver,
        }
    }

    /// Column bindings this writer emits with.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Write the `#%key=value` metadata preamble.
    ///
    /// A fresh run guid is generated here; `exec_guid` is the identifier
    /// minted at process start. Design header keys pass through only when
    /// they appear on the propagation allow-list, in design-file order.
    pub fn write_preamble(
        &mut self,
        exec_guid: &str,
        version: &str,
        command_line: &str,
        design_metadata: &[(HeaderKey, HeaderValue)],
    ) -> Result<(), DumpError> {
        self.meta_line(report::META_GUID, &runid::new_guid())?;
        self.meta_line(report::META_EXEC_GUID, exec_guid)?;
        self.meta_line(report::META_EXEC_VERSION, version)?;
        let created = Local::now().format(report::CREATE_DATE_FORMAT).to_string();
        self.meta_line(report::META_CREATE_DATE, &created)?;
        self.meta_line(report::META_CMD, command_line)?;
        for (key, value) in design_metadata {
            if design::PROPAGATED_KEYS.contains(&key.as_str()) {
                writeln!(
                    self.out,
                    "{}{}{}{}",
                    format::HEADER_PREFIX,
                    key,
                    format::HEADER_DELIMITER,
                    value
                )?;
            }
        }
        Ok(())
    }

    /// Write the single tab-joined column header line.
    pub fn write_header(&mut self) -> Result<(), DumpError> {
        writeln!(self.out, "{}", self.catalog.output_header().join("\t"))?;
        Ok(())
    }

    /// Emit an accepted group: one line in groups-only mode, otherwise one
    /// denormalized line per unit pulled from the cursor.
    pub fn emit_group(
        &mut self,
        design: &mut DesignSource,
        group: &GroupRecord,
    ) -> Result<(), DumpError> {
        if self.catalog.groups_only() {
            write!(self.out, "{}", group.id)?;
            for field in &group.fields {
                write!(self.out, "\t{field}")?;
            }
            writeln!(self.out)?;
            return Ok(());
        }
        while let Some(element) = design.next_element()? {
            while let Some(unit) = design.next_unit()? {
                self.emit_unit_row(group, &element, &unit)?;
            }
        }
        Ok(())
    }

    /// Emit one denormalized unit line: group fields, element fields, unit
    /// fields, then the joined coordinates when enabled.
    ///
    /// Unresolved coordinates are written as two empty fields, never a
    /// numeral substitute.
    pub fn emit_unit_row(
        &mut self,
        group: &GroupRecord,
        element: &ElementRecord,
        unit: &UnitRecord,
    ) -> Result<(), DumpError> {
        write!(self.out, "{}", group.id)?;
        for field in &group.fields {
            write!(self.out, "\t{field}")?;
        }
        for field in &element.fields {
            write!(self.out, "\t{field}")?;
        }
        write!(self.out, "\t{}", unit.id)?;
        for field in &unit.fields {
            write!(self.out, "\t{field}")?;
        }
        if self.catalog.join_coordinates() {
            let point = match self.resolver.as_mut() {
                Some(resolver) => resolver.resolve(unit.id)?,
                None => None,
            };
            match point {
                Some(point) => write!(self.out, "\t{}\t{}", point.x, point.y)?,
                None => write!(self.out, "\t\t")?,
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Flush the report stream.
    pub fn finish(&mut self) -> Result<(), DumpError> {
        self.out.flush()?;
        Ok(())
    }

    fn meta_line(&mut self, key: MetadataKey, value: &str) -> Result<(), DumpError> {
        writeln!(self.out, "{}{}", format::HEADER_PREFIX, key.encode(value))?;
        Ok(())
    }
}
