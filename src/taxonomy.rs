//! Type-path parsing and matching for group selection.

use crate::config::MatchMode;
use crate::constants::format::TYPE_DELIMITER;
use crate::types::TypeSegment;

/// Split a raw type string into its path segments.
///
/// Splits on the fixed `->` delimiter. Consecutive, leading, or trailing
/// delimiters never produce empty segments: `"a->->b"`, `"->a->b"`, and
/// `"a->b->"` all yield `["a", "b"]`.
pub fn split_type_path(raw: &str) -> Vec<TypeSegment> {
    raw.split(TYPE_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when `path` satisfies `requested` under the given match mode.
///
/// `And` requires every requested string to appear among the path segments;
/// `Or` requires at least one.
pub fn matches(path: &[TypeSegment], requested: &[String], mode: MatchMode) -> bool {
    match mode {
        MatchMode::And => requested.iter().all(|want| path.iter().any(|seg| seg == want)),
        MatchMode::Or => requested.iter().any(|want| path.iter().any(|seg| seg == want)),
    }
}
