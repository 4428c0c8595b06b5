#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Output schema derivation from design file schemas.
pub mod catalog;
/// Command-line surface and run orchestration.
pub mod cli;
/// Validated selection requests and run configuration.
pub mod config;
/// Centralized constants for file grammar, schemas, and report keys.
pub mod constants;
/// Coordinate resolution strategies for the layout join.
pub mod coords;
/// Transient record types produced by the source cursors.
pub mod data;
/// Header metadata key encoding helpers.
pub mod metadata;
/// Report preamble, header, and row emission.
pub mod report;
/// Run and execution identifier generation.
pub mod runid;
/// Selection strategies and id-list loading.
pub mod selection;
/// Tabular source readers and indexing.
pub mod source;
/// Type-path parsing and matching.
pub mod taxonomy;
/// Shared type aliases.
pub mod types;

mod errors;

pub use catalog::Catalog;
pub use config::{DumpConfig, IdLevel, MatchMode, SelectionConfig, SelectionRequest};
pub use coords::{CoordinateResolver, RegularGrid};
pub use data::{ElementRecord, GroupRecord, UnitPoint, UnitRecord};
pub use errors::DumpError;
pub use report::ReportWriter;
pub use selection::SelectionPlan;
pub use source::{ColumnIndex, DesignSource, LayoutSource, UnitSite};
pub use types::{GroupId, UnitId};
