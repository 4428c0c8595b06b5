/// Group identifier parsed from the first level-0 column.
/// Example: `2590411`
pub type GroupId = i64;
/// Unit identifier parsed from the first level-2 column.
/// Example: `5402769`
pub type UnitId = i64;
/// Column name taken from a `#%headerN` declaration.
/// Examples: `group_id`, `type`, `x`
pub type ColumnName = String;
/// One segment of a `->`-delimited type path.
/// Examples: `main`, `rescue`
pub type TypeSegment = String;
/// Key of a `#%key=value` header line.
/// Examples: `design_type`, `rows`
pub type HeaderKey = String;
/// Value of a `#%key=value` header line.
/// Examples: `grid-3k`, `row_major`
pub type HeaderValue = String;
/// Display name of an input file, used in diagnostics.
/// Example: `chip.design`
pub type SourceName = String;
