//! Run configuration: validated selection requests and dump settings.
//!
//! Selection exclusivity is enforced here, at construction, so the engine
//! only ever sees a single active selection mode.

use std::path::PathBuf;

use crate::errors::DumpError;
use crate::types::{GroupId, UnitId};

/// How requested type strings combine during a type query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Every requested string must appear in the record's type path.
    #[default]
    And,
    /// At least one requested string must appear in the record's type path.
    Or,
}

/// Which identifier level an id-list selection addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdLevel {
    /// Level-0 group identifiers.
    Group,
    /// Level-2 unit identifiers.
    Unit,
}

/// Validated selection request, before id-list files are read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionRequest {
    /// No filter: dump every group.
    Full,
    /// Select groups by ids listed in these files.
    GroupIdFiles(Vec<PathBuf>),
    /// Select units by ids listed in these files.
    UnitIdFiles(Vec<PathBuf>),
    /// Select groups whose type path matches the requested strings.
    Types {
        /// Requested type strings, empty entries already discarded.
        requested: Vec<String>,
        /// Intersection or union semantics.
        mode: MatchMode,
    },
}

impl SelectionRequest {
    /// Build a request from raw option values, rejecting mixed modes.
    ///
    /// Empty type strings are discarded before the exclusivity check, so
    /// `--group-type=""` does not count as a selection.
    pub fn new(
        types: Vec<String>,
        mode: MatchMode,
        group_id_files: Vec<PathBuf>,
        unit_id_files: Vec<PathBuf>,
    ) -> Result<Self, DumpError> {
        let requested: Vec<String> = types.into_iter().filter(|t| !t.is_empty()).collect();
        let chosen = usize::from(!requested.is_empty())
            + usize::from(!group_id_files.is_empty())
            + usize::from(!unit_id_files.is_empty());
        if chosen > 1 {
            return Err(DumpError::Configuration(
                "cannot mix --group-ids, --unit-ids, and --group-type".to_string(),
            ));
        }
        if !requested.is_empty() {
            Ok(Self::Types { requested, mode })
        } else if !group_id_files.is_empty() {
            Ok(Self::GroupIdFiles(group_id_files))
        } else if !unit_id_files.is_empty() {
            Ok(Self::UnitIdFiles(unit_id_files))
        } else {
            Ok(Self::Full)
        }
    }
}

/// Resolved selection configuration consumed by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionConfig {
    /// Dump every group in stored order.
    Full,
    /// Indexed lookup per id, in caller order with duplicates removed.
    IdSet {
        /// Identifier level the ids address.
        level: IdLevel,
        /// Requested ids, first occurrence kept, order preserved.
        ids: Vec<i64>,
    },
    /// Linear scan accepting groups whose type path matches.
    TypeQuery {
        /// Requested type strings.
        requested: Vec<String>,
        /// Intersection or union semantics.
        mode: MatchMode,
    },
}

impl SelectionConfig {
    /// Convenience constructor for a group-id selection.
    pub fn group_ids(ids: Vec<GroupId>) -> Self {
        Self::IdSet {
            level: IdLevel::Group,
            ids,
        }
    }

    /// Convenience constructor for a unit-id selection.
    pub fn unit_ids(ids: Vec<UnitId>) -> Self {
        Self::IdSet {
            level: IdLevel::Unit,
            ids,
        }
    }
}

/// Full configuration for one dump run.
#[derive(Clone, Debug)]
pub struct DumpConfig {
    /// Path of the design file to dump.
    pub design_path: PathBuf,
    /// Optional layout file enabling the coordinate join.
    pub layout_path: Option<PathBuf>,
    /// Path of the report file to write.
    pub out_path: PathBuf,
    /// Emit only group-level rows.
    pub groups_only: bool,
    /// Validated selection request.
    pub selection: SelectionRequest,
    /// Invoking command line, echoed into the report preamble.
    pub command_line: String,
}

impl DumpConfig {
    /// Validate cross-option constraints and assemble a run configuration.
    pub fn new(
        design_path: PathBuf,
        layout_path: Option<PathBuf>,
        out_path: PathBuf,
        groups_only: bool,
        selection: SelectionRequest,
        command_line: String,
    ) -> Result<Self, DumpError> {
        if groups_only && matches!(selection, SelectionRequest::UnitIdFiles(_)) {
            return Err(DumpError::Configuration(
                "cannot use --groups-only with --unit-ids".to_string(),
            ));
        }
        Ok(Self {
            design_path,
            layout_path,
            out_path,
            groups_only,
            selection,
            command_line,
        })
    }
}
