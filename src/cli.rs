//! Command-line surface and run orchestration.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use tracing::info;

use crate::catalog::Catalog;
use crate::config::{DumpConfig, MatchMode, SelectionRequest};
use crate::coords::CoordinateResolver;
use crate::errors::DumpError;
use crate::report::ReportWriter;
use crate::runid;
use crate::selection::{self, SelectionPlan};
use crate::source::{DesignSource, LayoutSource};

/// Version string stamped into the report preamble.
pub const VERSION: &str = concat!("designdump ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Parser)]
#[command(
    name = "designdump",
    version,
    disable_help_subcommand = true,
    about = "Dump information from a hierarchical design file",
    long_about = "Select groups or units from a design file and write one flat, \
tab-delimited report line per unit (or per group with --groups-only), optionally \
joining unit coordinates from a layout file.",
    after_help = "Selection modes are mutually exclusive: use --group-type, \
--group-ids, or --unit-ids, but never more than one of them."
)]
struct DumpCli {
    #[arg(
        short = 'd',
        long = "design-file",
        value_name = "PATH",
        help = "The design file used to dump information"
    )]
    design_file: PathBuf,
    #[arg(
        short = 'l',
        long = "layout-file",
        value_name = "PATH",
        help = "Optional layout file to use. When present, unit positions are included in the output"
    )]
    layout_file: Option<PathBuf>,
    #[arg(
        short = 'o',
        long = "out-file",
        value_name = "PATH",
        help = "Output file to contain the dump output"
    )]
    out_file: PathBuf,
    #[arg(
        long = "group-type",
        value_name = "TYPE",
        help = "Optional group type to extract; can be specified multiple times. \
When specified multiple times, the intersection of all types is taken"
    )]
    group_types: Vec<String>,
    #[arg(
        short = 's',
        long = "group-ids",
        value_name = "FILE",
        help = "Optional name of a file containing group ids to extract; can be specified multiple times"
    )]
    group_id_files: Vec<PathBuf>,
    #[arg(
        long = "unit-ids",
        value_name = "FILE",
        help = "Optional name of a file containing unit ids to extract; can be specified multiple times"
    )]
    unit_id_files: Vec<PathBuf>,
    #[arg(long = "groups-only", help = "Dump only group level information")]
    groups_only: bool,
    #[arg(
        long = "or",
        help = "Use the union of the types requested, not the intersection"
    )]
    union: bool,
}

/// Parse, validate, and execute a dump run from raw arguments.
///
/// Help and version requests print and return cleanly; every other
/// failure propagates for the binary to report and exit non-zero.
pub fn run_dump<I>(args: I) -> Result<(), Box<dyn Error>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let argv: Vec<String> = args.into_iter().map(Into::into).collect();
    let command_line = argv.join(" ");
    let Some(cli) = parse_cli::<DumpCli, _>(argv)? else {
        return Ok(());
    };

    let mode = if cli.union {
        MatchMode::Or
    } else {
        MatchMode::And
    };
    let request =
        SelectionRequest::new(cli.group_types, mode, cli.group_id_files, cli.unit_id_files)?;
    let config = DumpConfig::new(
        cli.design_file,
        cli.layout_file,
        cli.out_file,
        cli.groups_only,
        request,
        command_line,
    )?;
    execute(&config)?;
    Ok(())
}

/// Execute a validated dump configuration.
///
/// This is the whole run: resolve the selection, open the sources, choose
/// the coordinate strategy, derive the catalog, then stream the report.
pub fn execute(config: &DumpConfig) -> Result<(), DumpError> {
    let exec_guid = runid::new_guid();
    info!("{VERSION}");
    info!("cmd: {}", config.command_line);
    info!(%exec_guid, "starting dump");

    let selection = selection::resolve_request(&config.selection)?;

    info!("reading metadata from design and layout files");
    let mut design = DesignSource::open(&config.design_path)?;
    let resolver = match &config.layout_path {
        Some(path) => Some(CoordinateResolver::from_layout(LayoutSource::open(path)?)?),
        None => None,
    };
    let catalog = Catalog::build(
        design.source_name(),
        design.schema(0),
        design.schema(1),
        design.schema(2),
        config.groups_only,
        resolver.is_some(),
    )?;
    let plan = SelectionPlan::new(&selection, &catalog, design.source_name())?;

    let out = File::create(&config.out_path).map_err(|err| DumpError::Open {
        path: config.out_path.display().to_string(),
        reason: err.to_string(),
    })?;
    let mut report = ReportWriter::new(BufWriter::new(out), catalog, resolver);
    report.write_preamble(&exec_guid, VERSION, &config.command_line, design.metadata())?;
    report.write_header()?;
    plan.execute(&mut design, &mut report)?;
    report.finish()
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
