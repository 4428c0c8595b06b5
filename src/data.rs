//! Transient record types produced by the design and layout cursors.
//!
//! Records exist only while the read cursor is positioned on them; the
//! assembler writes each denormalized row group before the next record is
//! pulled, so memory stays proportional to schema width.

use crate::types::{GroupId, UnitId};

/// A level-0 design row: group identifier plus its remaining fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRecord {
    /// Identifier parsed from the first level-0 column.
    pub id: GroupId,
    /// Remaining level-0 field values, in schema order.
    pub fields: Vec<String>,
}

/// A level-1 design row. Elements carry no identifier of their own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRecord {
    /// Level-1 field values, in schema order.
    pub fields: Vec<String>,
}

/// A level-2 design row: unit identifier plus its remaining fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitRecord {
    /// Identifier parsed from the first level-2 column.
    pub id: UnitId,
    /// Remaining level-2 field values, in schema order.
    pub fields: Vec<String>,
}

/// A resolved unit position on the layout grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitPoint {
    /// Horizontal grid position.
    pub x: i64,
    /// Vertical grid position.
    pub y: i64,
}
