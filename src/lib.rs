//! Locmatch: overlap scoring, matching and suppression for located-object
//! detections.
//!
//! Detections (bounding boxes or polygons with metadata) are exchanged as
//! flat, prefix-keyed reports. The engine decodes a report, computes
//! overlaps between collections, finds best correspondences, counts region
//! membership, suppresses duplicates, aggregates overlap regions, and
//! re-encodes the result.
//!
//! # Modules
//!
//! - [`geom`]: rectangle and polygon primitives
//! - [`object`]: the located-object model and collections
//! - [`report`]: the flat-field report format and codec
//! - [`overlap`]: pairwise overlap ratio metrics
//! - [`matching`]: correspondence building between collections
//! - [`region`]: region membership counting
//! - [`suppress`]: overlap-based duplicate removal
//! - [`aggregate`]: intersection/union region aggregation
//! - [`finder`]: object finders and the storage boundary
//! - [`error`]: error types for locmatch operations

pub mod aggregate;
pub mod error;
pub mod finder;
pub mod geom;
pub mod matching;
pub mod object;
pub mod overlap;
pub mod region;
pub mod report;
pub mod suppress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::LocmatchError;

use overlap::{GeometryMode, OverlapCalc, OverlapMetric};
use suppress::RemovalStrategy;

/// The locmatch CLI application.
#[derive(Parser)]
#[command(name = "locmatch")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compute overlaps between two detection reports.
    Overlap(OverlapArgs),

    /// Count how many objects fall inside a rectangular region.
    Count(CountArgs),

    /// Remove overlapping detections from a report.
    Suppress(SuppressArgs),
}

/// Arguments for the overlap subcommand.
#[derive(clap::Args)]
struct OverlapArgs {
    /// Report with the actual objects (annotations).
    actual: PathBuf,

    /// Report with the other objects (predictions).
    other: PathBuf,

    /// Object field prefix.
    #[arg(long, default_value = report::DEFAULT_PREFIX)]
    prefix: String,

    /// Overlap metric ('iou', 'area-ratio' or 'dice').
    #[arg(long, default_value = "iou")]
    metric: String,

    /// Use polygon outlines where available.
    #[arg(long)]
    polygon: bool,

    /// Minimum overlap ratio for a pair to count.
    #[arg(long, default_value_t = 0.0)]
    min_ratio: f64,

    /// Metadata key holding the object label.
    #[arg(long)]
    label_key: Option<String>,

    /// Also emit unmatched other objects, tagged as additional.
    #[arg(long)]
    additional: bool,

    /// Output file; stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Arguments for the count subcommand.
#[derive(clap::Args)]
struct CountArgs {
    /// Report with the objects to count.
    input: PathBuf,

    /// Object field prefix.
    #[arg(long, default_value = report::DEFAULT_PREFIX)]
    prefix: String,

    /// Left edge of the region.
    #[arg(long)]
    left: i32,

    /// Top edge of the region.
    #[arg(long)]
    top: i32,

    /// Width of the region.
    #[arg(long)]
    width: i32,

    /// Height of the region.
    #[arg(long)]
    height: i32,

    /// Region coordinates are 1-based.
    #[arg(long)]
    one_based: bool,

    /// Credit partially contained objects with their overlap ratio.
    #[arg(long)]
    partial: bool,

    /// Metadata key holding the object type; enables type filtering.
    #[arg(long)]
    type_suffix: Option<String>,

    /// Pattern the type value must match.
    #[arg(long)]
    type_regex: Option<String>,
}

/// Arguments for the suppress subcommand.
#[derive(clap::Args)]
struct SuppressArgs {
    /// Report with the objects to deduplicate.
    input: PathBuf,

    /// Object field prefix.
    #[arg(long, default_value = report::DEFAULT_PREFIX)]
    prefix: String,

    /// Overlap metric ('iou', 'area-ratio' or 'dice').
    #[arg(long, default_value = "area-ratio")]
    metric: String,

    /// Use polygon outlines where available.
    #[arg(long)]
    polygon: bool,

    /// Minimum overlap ratio for a pair to be flagged.
    #[arg(long, default_value_t = 0.5)]
    min_ratio: f64,

    /// Removal strategy ('smaller', 'larger' or 'both').
    #[arg(long, default_value = "smaller")]
    strategy: String,

    /// Resolve duplicate index values before suppression.
    #[arg(long)]
    resolve_indices: bool,

    /// Output file; stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Run the locmatch CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LocmatchError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Overlap(args)) => run_overlap(args),
        Some(Commands::Count(args)) => run_count(args),
        Some(Commands::Suppress(args)) => run_suppress(args),
        None => {
            println!("locmatch {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Overlap scoring, matching and suppression for detections.");
            println!();
            println!("Run 'locmatch --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the overlap subcommand.
fn run_overlap(args: OverlapArgs) -> Result<(), LocmatchError> {
    let calc = parse_calc(&args.metric, args.polygon)?;

    let actual_report = report::read_report_json(&args.actual)?;
    let other_report = report::read_report_json(&args.other)?;

    let actual = report::codec::from_report(&actual_report, &args.prefix);
    let other = report::codec::from_report(&other_report, &args.prefix);

    let opts = matching::MatchOptions {
        min_ratio: args.min_ratio,
        label_key: args.label_key.clone(),
        additional_object: args.additional,
        ..Default::default()
    };
    let annotated = matching::annotate(&calc, &actual, &other, &opts);
    let result = report::codec::replace_objects(&actual_report, &args.prefix, &annotated);

    emit(&result, args.output.as_deref())
}

/// Execute the count subcommand.
fn run_count(args: CountArgs) -> Result<(), LocmatchError> {
    let input = report::read_report_json(&args.input)?;
    let objects = report::codec::from_report(&input, &args.prefix);

    let region = region::Region::rect(args.left, args.top, args.width, args.height)?;

    let type_find = match &args.type_regex {
        Some(pattern) => Some(regex::Regex::new(pattern).map_err(|source| {
            LocmatchError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            }
        })?),
        None => None,
    };
    let opts = region::CountOptions {
        one_based: args.one_based,
        partial_counts: args.partial,
        check_type: args.type_suffix.is_some(),
        type_suffix: args.type_suffix.clone().unwrap_or_default(),
        type_find,
    };

    let count = region::count(&objects, &region, &opts);
    if count.fract() == 0.0 {
        println!("{}", count as i64);
    } else {
        println!("{}", count);
    }
    Ok(())
}

/// Execute the suppress subcommand.
fn run_suppress(args: SuppressArgs) -> Result<(), LocmatchError> {
    let calc = parse_calc(&args.metric, args.polygon)?;
    let strategy = match args.strategy.as_str() {
        "smaller" => RemovalStrategy::RemoveSmaller,
        "larger" => RemovalStrategy::RemoveLarger,
        "both" => RemovalStrategy::RemoveBoth,
        other => {
            return Err(LocmatchError::unsupported(
                "removal strategy (supported: smaller, larger, both)",
                other,
            ));
        }
    };

    let input = report::read_report_json(&args.input)?;
    let result = suppress::suppress_report(
        &input,
        &args.prefix,
        args.resolve_indices,
        None,
        &calc,
        args.min_ratio,
        strategy,
    );

    emit(&result, args.output.as_deref())
}

fn parse_calc(metric: &str, polygon: bool) -> Result<OverlapCalc, LocmatchError> {
    let metric = match metric {
        "iou" => OverlapMetric::IntersectOverUnion,
        "area-ratio" => OverlapMetric::AreaRatio,
        "dice" => OverlapMetric::Dice,
        other => {
            return Err(LocmatchError::unsupported(
                "metric (supported: iou, area-ratio, dice)",
                other,
            ));
        }
    };
    let geometry = if polygon {
        GeometryMode::Polygon {
            bbox_fallback_ratio: 0.0,
        }
    } else {
        GeometryMode::BoundingBox
    };
    Ok(OverlapCalc { metric, geometry })
}

fn emit(result: &report::Report, output: Option<&std::path::Path>) -> Result<(), LocmatchError> {
    match output {
        Some(path) => report::write_report_json(path, result),
        None => {
            let json = report::to_json_string(result).map_err(|source| {
                LocmatchError::ReportJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
            Ok(())
        }
    }
}
