//! Single-column integer indexes and the at-most-one-match contract.

use std::collections::HashMap;

use crate::errors::DumpError;
use crate::types::SourceName;

/// Byte offsets locating one unit row together with its owning context.
///
/// Seeking straight to a level-2 row would leave the owning group and
/// element unknown, so the index records all three positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSite {
    /// Offset of the owning level-0 row.
    pub group: u64,
    /// Offset of the owning level-1 row.
    pub element: u64,
    /// Offset of the level-2 row itself.
    pub unit: u64,
}

/// Index over a single integer identifier column.
///
/// Lookups are contractually expected to match at most one row; observing
/// more than one is a data-integrity failure, not a tie to break.
#[derive(Debug)]
pub struct ColumnIndex<T> {
    entries: HashMap<i64, Vec<T>>,
    column: &'static str,
    source: SourceName,
}

impl<T> ColumnIndex<T> {
    /// Create an empty index for `column` of `source`.
    pub fn new(column: &'static str, source: impl Into<SourceName>) -> Self {
        Self {
            entries: HashMap::new(),
            column,
            source: source.into(),
        }
    }

    /// Record one row location for `key`.
    pub fn insert(&mut self, key: i64, location: T) {
        self.entries.entry(key).or_default().push(location);
    }

    /// Number of distinct keys recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up `key` under the uniqueness contract.
    ///
    /// Zero matches is a valid absent outcome (`Ok(None)`); more than one
    /// match aborts the run with `NonUniqueIndex`.
    pub fn at_most_one(&self, key: i64) -> Result<Option<&T>, DumpError> {
        match self.entries.get(&key) {
            None => Ok(None),
            Some(locations) if locations.len() == 1 => Ok(Some(&locations[0])),
            Some(_) => Err(DumpError::NonUniqueIndex {
                column: self.column,
                key,
                src: self.source.clone(),
            }),
        }
    }
}
