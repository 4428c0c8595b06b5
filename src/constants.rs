use crate::metadata::MetadataKey;

/// Constants of the shared tabular file grammar.
pub mod format {
    /// Prefix of `#%key=value` header lines.
    pub const HEADER_PREFIX: &str = "#%";
    /// Prefix of comment lines skipped during reads.
    pub const COMMENT_PREFIX: &str = "#";
    /// Separator between a header key and its value.
    pub const HEADER_DELIMITER: &str = "=";
    /// Key prefix of per-level column declarations (`header0`..`header2`).
    pub const LEVEL_HEADER_PREFIX: &str = "header";
    /// Field separator of data lines; leading repeats give the nesting level.
    pub const FIELD_DELIMITER: char = '\t';
    /// Delimiter between segments of a type path.
    pub const TYPE_DELIMITER: &str = "->";
}

/// Constants of the design-file schema contract.
pub mod design {
    /// Required first level-0 column.
    pub const GROUP_ID_COLUMN: &str = "group_id";
    /// Required first level-2 column.
    pub const UNIT_ID_COLUMN: &str = "unit_id";
    /// Optional level-0 column holding the group's type path.
    pub const TYPE_COLUMN: &str = "type";
    /// Design header keys copied verbatim into the report preamble.
    pub const PROPAGATED_KEYS: [&str; 3] = ["design_type", "lib_set_name", "lib_set_version"];
}

/// Constants of the layout-file schema and regularity headers.
pub mod layout {
    /// Required first layout column.
    pub const UNIT_ID_COLUMN: &str = "unit_id";
    /// Column holding the horizontal grid position.
    pub const X_COLUMN: &str = "x";
    /// Column holding the vertical grid position.
    pub const Y_COLUMN: &str = "y";
    /// Header key declaring the grid row count.
    pub const ROWS_KEY: &str = "rows";
    /// Header key declaring the grid column count.
    pub const COLS_KEY: &str = "cols";
    /// Header key declaring sequential unit-id layout.
    pub const SEQUENTIAL_KEY: &str = "sequential";
    /// Header key declaring the grid traversal order.
    pub const ORDER_KEY: &str = "order";
    /// `sequential` value required for the arithmetic strategy.
    pub const SEQUENTIAL_TRUE: &str = "1";
    /// `order` value required for the arithmetic strategy (`x` varies fastest).
    pub const ORDER_ROW_MAJOR: &str = "row_major";
}

/// Constants used by report preamble emission.
pub mod report {
    use super::MetadataKey;

    /// Preamble key carrying the freshly generated run identifier.
    pub const META_GUID: MetadataKey = MetadataKey::new("guid");
    /// Preamble key carrying the execution identifier.
    pub const META_EXEC_GUID: MetadataKey = MetadataKey::new("exec_guid");
    /// Preamble key carrying the tool version string.
    pub const META_EXEC_VERSION: MetadataKey = MetadataKey::new("exec_version");
    /// Preamble key carrying the report creation timestamp.
    pub const META_CREATE_DATE: MetadataKey = MetadataKey::new("create_date");
    /// Preamble key carrying the invoking command line.
    pub const META_CMD: MetadataKey = MetadataKey::new("cmd");
    /// asctime-style rendering used for `create_date`.
    pub const CREATE_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";
}
