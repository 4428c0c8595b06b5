//! Coordinate resolution for the optional unit-position join.
//!
//! One of two strategies is chosen per run, before any row is emitted, by
//! probing the layout file's headers. Both answer the same question: where
//! does a unit sit on the grid, or `None` when the layout does not place it.

use tracing::debug;

use crate::constants::layout;
use crate::data::UnitPoint;
use crate::errors::DumpError;
use crate::source::index::ColumnIndex;
use crate::source::layout::LayoutSource;
use crate::types::UnitId;

/// Regular grid dimensions recovered from layout headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegularGrid {
    rows: i64,
    cols: i64,
}

impl RegularGrid {
    /// Probe a layout file's headers for a provably regular grid.
    ///
    /// Regularity requires `sequential=1`, `order=row_major`, and positive
    /// `rows` and `cols`. Only headers are consulted; the data section is
    /// never touched.
    pub fn detect(source: &LayoutSource) -> Option<Self> {
        Self::from_header_values(
            source.header_value(layout::SEQUENTIAL_KEY),
            source.header_value(layout::ORDER_KEY),
            source.header_value(layout::ROWS_KEY),
            source.header_value(layout::COLS_KEY),
        )
    }

    fn from_header_values(
        sequential: Option<&str>,
        order: Option<&str>,
        rows: Option<&str>,
        cols: Option<&str>,
    ) -> Option<Self> {
        if sequential?.trim() != layout::SEQUENTIAL_TRUE {
            return None;
        }
        if order?.trim() != layout::ORDER_ROW_MAJOR {
            return None;
        }
        let rows = rows?.trim().parse::<i64>().ok()?;
        let cols = cols?.trim().parse::<i64>().ok()?;
        if rows <= 0 || cols <= 0 {
            return None;
        }
        Some(Self { rows, cols })
    }

    /// Closed-form position of `unit_id` on the grid.
    ///
    /// Ids run `1..=rows*cols` in row-major order with `x` varying
    /// fastest; ids outside that range have no position.
    pub fn point(&self, unit_id: UnitId) -> Option<UnitPoint> {
        if unit_id < 1 {
            return None;
        }
        let ordinal = unit_id - 1;
        if ordinal >= self.rows.saturating_mul(self.cols) {
            return None;
        }
        Some(UnitPoint {
            x: ordinal % self.cols,
            y: ordinal / self.cols,
        })
    }
}

/// Indexed fallback over an irregular layout file.
#[derive(Debug)]
pub struct IndexedLayout {
    source: LayoutSource,
    index: ColumnIndex<u64>,
    x_slot: usize,
    y_slot: usize,
}

/// Strategy resolving unit coordinates, fixed for the run's duration.
#[derive(Debug)]
pub enum CoordinateResolver {
    /// Closed-form computation over a regular grid; O(1), no lookups.
    Arithmetic(RegularGrid),
    /// Unique-index lookup into the layout file.
    Indexed(IndexedLayout),
}

impl CoordinateResolver {
    /// Choose the strategy for `source`, probing its headers once.
    pub fn from_layout(source: LayoutSource) -> Result<Self, DumpError> {
        match RegularGrid::detect(&source) {
            Some(grid) => {
                debug!(source = %source.source_name(), "layout is regular, using arithmetic coordinates");
                Ok(Self::Arithmetic(grid))
            }
            None => {
                debug!(source = %source.source_name(), "layout is irregular, indexing unit ids");
                Self::indexed(source)
            }
        }
    }

    /// Build the indexed strategy regardless of the layout's regularity.
    ///
    /// `from_layout` is the normal entry point; this one exists so a
    /// regular layout can be cross-checked against its own index.
    pub fn indexed(mut source: LayoutSource) -> Result<Self, DumpError> {
        let x_slot = source
            .column_slot(layout::X_COLUMN)
            .ok_or_else(|| DumpError::Schema {
                src: source.source_name().to_string(),
                reason: format!("layout file has no '{}' column", layout::X_COLUMN),
            })?;
        let y_slot = source
            .column_slot(layout::Y_COLUMN)
            .ok_or_else(|| DumpError::Schema {
                src: source.source_name().to_string(),
                reason: format!("layout file has no '{}' column", layout::Y_COLUMN),
            })?;
        let index = source.build_unit_index()?;
        Ok(Self::Indexed(IndexedLayout {
            source,
            index,
            x_slot,
            y_slot,
        }))
    }

    /// Resolve the grid position of `unit_id`.
    ///
    /// Absent units are a valid outcome (`Ok(None)`); a duplicate id in an
    /// indexed layout is a fatal `NonUniqueIndex` error.
    pub fn resolve(&mut self, unit_id: UnitId) -> Result<Option<UnitPoint>, DumpError> {
        match self {
            Self::Arithmetic(grid) => Ok(grid.point(unit_id)),
            Self::Indexed(indexed) => match indexed.index.at_most_one(unit_id)?.copied() {
                None => Ok(None),
                Some(offset) => indexed
                    .source
                    .read_point_at(offset, indexed.x_slot, indexed.y_slot)
                    .map(Some),
            },
        }
    }
}
