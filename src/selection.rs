//! Selection strategies that decide which design rows reach the report.
//!
//! A validated `SelectionPlan` is built once per run from the resolved
//! `SelectionConfig` and then drives the design cursor: either the
//! streaming walk (full dump, type query) or unique-index lookups (id
//! sets). The two driving styles are never mixed within a run.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::{IdLevel, MatchMode, SelectionConfig, SelectionRequest};
use crate::constants::design;
use crate::errors::DumpError;
use crate::report::ReportWriter;
use crate::source::{DesignSource, LineReader, display_name};
use crate::taxonomy;
use crate::types::{GroupId, UnitId};

/// Resolve a validated request into an engine-ready selection.
///
/// Id-list files are read here, in argument order, with duplicates
/// dropped keeping the first occurrence.
pub fn resolve_request(request: &SelectionRequest) -> Result<SelectionConfig, DumpError> {
    match request {
        SelectionRequest::Full => Ok(SelectionConfig::Full),
        SelectionRequest::Types { requested, mode } => Ok(SelectionConfig::TypeQuery {
            requested: requested.clone(),
            mode: *mode,
        }),
        SelectionRequest::GroupIdFiles(files) => {
            let ids = read_id_lists(files, design::GROUP_ID_COLUMN)?;
            info!("found {} groups in id list files", ids.len());
            Ok(SelectionConfig::group_ids(ids))
        }
        SelectionRequest::UnitIdFiles(files) => {
            let ids = read_id_lists(files, design::UNIT_ID_COLUMN)?;
            info!("found {} units in id list files", ids.len());
            Ok(SelectionConfig::unit_ids(ids))
        }
    }
}

fn read_id_lists(files: &[PathBuf], column: &str) -> Result<Vec<i64>, DumpError> {
    let mut ids: IndexSet<i64> = IndexSet::new();
    for path in files {
        read_id_list(path, column, &mut ids)?;
    }
    Ok(ids.into_iter().collect())
}

/// Read one id-list file: a flat tabular file whose first non-comment
/// line names its columns, one of which must be `column`.
fn read_id_list(path: &Path, column: &str, ids: &mut IndexSet<i64>) -> Result<(), DumpError> {
    let source_name = display_name(path);
    let mut reader = LineReader::open(path).map_err(|err| DumpError::Open {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let mut id_slot: Option<usize> = None;
    while let Some((_, line, text)) = reader.next_line()? {
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = text.split('\t').collect();
        match id_slot {
            None => {
                let Some(slot) = fields.iter().position(|name| *name == column) else {
                    return Err(DumpError::Open {
                        path: path.display().to_string(),
                        reason: format!("no '{column}' column"),
                    });
                };
                id_slot = Some(slot);
            }
            Some(slot) => {
                let Some(raw) = fields.get(slot) else {
                    return Err(DumpError::Malformed {
                        src: source_name,
                        line,
                        reason: format!("missing '{column}' field"),
                    });
                };
                let id = raw.trim().parse::<i64>().map_err(|_| DumpError::Malformed {
                    src: source_name.clone(),
                    line,
                    reason: format!("'{raw}' is not an integer id"),
                })?;
                ids.insert(id);
            }
        }
    }
    Ok(())
}

/// Selection bound to a catalog, ready to drive the design cursor.
#[derive(Clone, Debug)]
pub enum SelectionPlan {
    /// Accept every group in stored order.
    Full,
    /// Indexed lookups by group id, in request order.
    ByGroupId(Vec<GroupId>),
    /// Indexed lookups by unit id, in request order.
    ByUnitId(Vec<UnitId>),
    /// Linear scan accepting groups whose type path matches.
    ByType {
        /// Requested type strings.
        requested: Vec<String>,
        /// Intersection or union semantics.
        mode: MatchMode,
        /// Slot of the type column within group fields.
        type_slot: usize,
    },
}

impl SelectionPlan {
    /// Validate a selection against the catalog and bind its driving data.
    ///
    /// A type query without a type column in the design file fails here,
    /// before any output is produced.
    pub fn new(
        selection: &SelectionConfig,
        catalog: &Catalog,
        source_name: &str,
    ) -> Result<Self, DumpError> {
        match selection {
            SelectionConfig::Full => Ok(Self::Full),
            SelectionConfig::IdSet {
                level: IdLevel::Group,
                ids,
            } => Ok(Self::ByGroupId(ids.clone())),
            SelectionConfig::IdSet {
                level: IdLevel::Unit,
                ids,
            } => Ok(Self::ByUnitId(ids.clone())),
            SelectionConfig::TypeQuery { requested, mode } => {
                let type_slot =
                    catalog
                        .type_slot()
                        .ok_or_else(|| DumpError::MissingTypeColumn {
                            src: source_name.to_string(),
                        })?;
                Ok(Self::ByType {
                    requested: requested.clone(),
                    mode: *mode,
                    type_slot,
                })
            }
        }
    }

    /// Drive the design cursor, emitting accepted rows through the report.
    ///
    /// Indexed lookups follow the uniqueness contract: an id with no match
    /// is skipped quietly; an id matching more than one row aborts the run
    /// before any later id is attempted.
    pub fn execute<W: std::io::Write>(
        &self,
        design: &mut DesignSource,
        report: &mut ReportWriter<W>,
    ) -> Result<(), DumpError> {
        match self {
            Self::Full => {
                info!("dumping entire design file");
                while let Some(group) = design.next_group()? {
                    report.emit_group(design, &group)?;
                }
                Ok(())
            }
            Self::ByGroupId(ids) => {
                info!("indexing groups in design file");
                let index = design.build_group_index()?;
                info!("dumping group info");
                for id in ids {
                    let Some(offset) = index.at_most_one(*id)?.copied() else {
                        continue;
                    };
                    let group = design.read_group_at(offset)?;
                    report.emit_group(design, &group)?;
                }
                Ok(())
            }
            Self::ByUnitId(ids) => {
                info!("indexing units in design file");
                let index = design.build_unit_index()?;
                info!("dumping unit info");
                for id in ids {
                    let Some(site) = index.at_most_one(*id)?.copied() else {
                        continue;
                    };
                    let (group, element, unit) = design.read_unit_site(site)?;
                    report.emit_unit_row(&group, &element, &unit)?;
                }
                Ok(())
            }
            Self::ByType {
                requested,
                mode,
                type_slot,
            } => {
                info!("scanning design file for requested type(s)");
                while let Some(group) = design.next_group()? {
                    let path = taxonomy::split_type_path(&group.fields[*type_slot]);
                    if taxonomy::matches(&path, requested, *mode) {
                        report.emit_group(design, &group)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_id_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn id_lists_dedup_keeping_first_occurrence_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_id_file(&dir, "a.txt", "group_id\n5\n5\n9\n");
        let second = write_id_file(&dir, "b.txt", "extra\tgroup_id\nx\t9\ny\t42\n");
        let ids = read_id_lists(&[first, second], "group_id").unwrap();
        assert_eq!(ids, vec![5, 9, 42]);
    }

    #[test]
    fn id_list_without_the_required_column_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_id_file(&dir, "bad.txt", "unit_id\n5\n");
        let err = read_id_lists(&[path], "group_id").unwrap_err();
        assert!(matches!(err, DumpError::Open { .. }));
    }

    #[test]
    fn id_list_comments_and_blanks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_id_file(
            &dir,
            "ids.txt",
            "#%made_by=designdump\n# a comment\ngroup_id\n\n7\n",
        );
        let ids = read_id_lists(&[path], "group_id").unwrap();
        assert_eq!(ids, vec![7]);
    }

    #[test]
    fn id_list_with_a_non_integer_id_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_id_file(&dir, "ids.txt", "group_id\nseven\n");
        let err = read_id_lists(&[path], "group_id").unwrap_err();
        assert!(matches!(err, DumpError::Malformed { .. }));
    }
}
