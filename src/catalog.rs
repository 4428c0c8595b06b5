//! Output schema derivation from the design file's per-level schemas.

use crate::constants::{design, layout};
use crate::errors::DumpError;
use crate::types::ColumnName;

/// Column bindings derived once at setup; pure and read-only afterwards.
///
/// The catalog fixes the report column order: group columns (identifier
/// first), then element columns, then unit columns (identifier first),
/// then the injected coordinate columns when the join is enabled. In
/// groups-only mode only the group columns are retained.
#[derive(Clone, Debug)]
pub struct Catalog {
    group_columns: Vec<ColumnName>,
    element_columns: Vec<ColumnName>,
    unit_columns: Vec<ColumnName>,
    type_slot: Option<usize>,
    groups_only: bool,
    join_coordinates: bool,
}

impl Catalog {
    /// Derive the output schema from per-level design schemas.
    ///
    /// The identifier column must be the first column of its level; any
    /// other position is a schema error. `join_coordinates` asks for the
    /// injected `x`/`y` columns; it is ignored in groups-only mode, which
    /// has no unit rows to join.
    pub fn build(
        source_name: &str,
        level0: &[ColumnName],
        level1: &[ColumnName],
        level2: &[ColumnName],
        groups_only: bool,
        join_coordinates: bool,
    ) -> Result<Self, DumpError> {
        if level0.first().map(String::as_str) != Some(design::GROUP_ID_COLUMN) {
            return Err(DumpError::Schema {
                src: source_name.to_string(),
                reason: format!(
                    "'{}' must be the first level-0 column",
                    design::GROUP_ID_COLUMN
                ),
            });
        }
        let type_slot = level0
            .iter()
            .skip(1)
            .position(|name| name == design::TYPE_COLUMN);
        if !groups_only && level2.first().map(String::as_str) != Some(design::UNIT_ID_COLUMN) {
            return Err(DumpError::Schema {
                src: source_name.to_string(),
                reason: format!(
                    "'{}' must be the first level-2 column",
                    design::UNIT_ID_COLUMN
                ),
            });
        }
        let (element_columns, unit_columns) = if groups_only {
            (Vec::new(), Vec::new())
        } else {
            (level1.to_vec(), level2.to_vec())
        };
        Ok(Self {
            group_columns: level0.to_vec(),
            element_columns,
            unit_columns,
            type_slot,
            groups_only,
            join_coordinates: join_coordinates && !groups_only,
        })
    }

    /// Report column names, in emission order.
    pub fn output_header(&self) -> Vec<ColumnName> {
        let mut header = self.group_columns.clone();
        header.extend(self.element_columns.iter().cloned());
        header.extend(self.unit_columns.iter().cloned());
        if self.join_coordinates {
            header.push(layout::X_COLUMN.to_string());
            header.push(layout::Y_COLUMN.to_string());
        }
        header
    }

    /// Slot of the `type` column within group fields, if the design has one.
    pub fn type_slot(&self) -> Option<usize> {
        self.type_slot
    }

    /// True when only group-level rows are emitted.
    pub fn groups_only(&self) -> bool {
        self.groups_only
    }

    /// True when resolved coordinates are appended to unit rows.
    pub fn join_coordinates(&self) -> bool {
        self.join_coordinates
    }
}
