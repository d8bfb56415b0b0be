//! eyecatching CLI - Visual regression diff of browser screenshots
//!
//! Compare two screenshots of the same page and write the reference image
//! with divergent regions highlighted.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, ColorChoice, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyecatching::consts::{DEFAULT_BLOCK_SIZE, DEFAULT_OUTPUT_ID, DEFAULT_THRESHOLD};
use eyecatching::{
    normalize_pair, output_file_name, BlockReport, DiffError, DiffOutcome, DiffParams,
    DiffSession, HashAlgorithm, ImageHandle, Method,
};
use serde::Serialize;

/// Smallest block size accepted on the command line, px.
const MIN_CLI_BLOCK_SIZE: u32 = 8;

/// Eyecatching visual regression diff
///
/// Compares two screenshots of the same web page (for example one from
/// Chrome and one from Firefox) block by block with a perceptual hash.
/// Blocks whose fingerprints diverge are tinted in the output image; the
/// stronger the tint, the larger the difference.
#[derive(Parser, Debug)]
#[command(name = "eyecatching")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    Compare with a fixed 20px grid:
        eyecatching linear chrome.png firefox.png

    Adaptive subdivision with difference hashing:
        eyecatching recursive --algorithm dhash chrome.png firefox.png

    Screenshots of different heights, JSON report:
        eyecatching linear --normalize --json chrome.png firefox.png

    CI mode - fail when any block is flagged:
        eyecatching linear --fail-on-diff chrome.png firefox.png

EXIT CODES:
    0 - Success
    1 - Differences found (--fail-on-diff)
    2 - Error (file not found, invalid image, bad option, etc.)")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorChoice,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two screenshots tile by tile on a fixed grid
    Linear(CompareArgs),
    /// Compare two screenshots by recursive halving of dissimilar regions
    Recursive(CompareArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Reference screenshot (receives the highlights)
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Candidate screenshot
    #[arg(value_name = "CANDIDATE")]
    candidate: PathBuf,

    /// Perceptual hashing algorithm: ahash, phash, dhash, whash
    #[arg(short, long, default_value = "ahash", value_name = "ALG")]
    algorithm: String,

    /// Hash distance threshold (1-64)
    ///
    /// Linear: tiles at or above it are flagged.
    /// Recursive: regions at or below it stop subdividing.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, value_name = "BITS")]
    threshold: u32,

    /// Tile edge (linear) or smallest region edge (recursive), px. Min: 8
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE, value_name = "PX")]
    block_size: u32,

    /// Output image path [default: output_<method>_<id>_<ref>_<com>_<alg>.<ext>]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Identifier embedded in the default output name
    #[arg(long, default_value = DEFAULT_OUTPUT_ID, value_name = "ID")]
    output_id: String,

    /// Pad the smaller screenshot with white so both sizes match
    #[arg(long)]
    normalize: bool,

    /// Pad both screenshots with white to a multiple of the block size
    #[arg(long)]
    extend: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output JSON (shorthand for --format json)
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Quiet mode - only print the flagged block count
    #[arg(long, short = 's')]
    quiet: bool,

    /// Exit with code 1 when any block is flagged
    #[arg(long)]
    fail_on_diff: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Plain text summary
    Text,
    /// JSON with statistics and flagged blocks
    Json,
    /// Minimal - just the flagged block count
    Count,
}

#[derive(Serialize)]
struct JsonOutput {
    method: &'static str,
    reference: String,
    candidate: String,
    output: String,
    width: u32,
    height: u32,
    params: JsonParams,
    stats: JsonStats,
    blocks: Vec<JsonBlock>,
}

#[derive(Serialize)]
struct JsonParams {
    algorithm: &'static str,
    threshold: u32,
    block_size: u32,
}

#[derive(Serialize)]
struct JsonStats {
    examined: usize,
    flagged: usize,
    average_dissimilarity_percent: f64,
    elapsed_seconds: f64,
}

#[derive(Serialize)]
struct JsonBlock {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    distance: u32,
    percent: f64,
    opacity: f32,
}

impl From<&BlockReport> for JsonBlock {
    fn from(block: &BlockReport) -> Self {
        let (x1, y1, x2, y2) = block.region.corners();
        Self {
            x1,
            y1,
            x2,
            y2,
            distance: block.distance,
            percent: block.percent,
            opacity: block.opacity,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_colors(cli.color);

    let (method, args) = match &cli.command {
        Command::Linear(args) => (Method::Linear, args),
        Command::Recursive(args) => (Method::Recursive, args),
    };

    match run(method, args) {
        Ok(outcome) => {
            if args.fail_on_diff && outcome.stats.flagged > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn setup_colors(color: ColorChoice) {
    match color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            // Disable colors if not a terminal
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

fn run(method: Method, args: &CompareArgs) -> Result<DiffOutcome, String> {
    if args.block_size < MIN_CLI_BLOCK_SIZE {
        return Err(format!(
            "block size {} is too small, use {MIN_CLI_BLOCK_SIZE} or more",
            args.block_size
        ));
    }

    // Resolve everything that can fail before touching the images
    let algorithm: HashAlgorithm = args.algorithm.parse().map_err(|e: DiffError| e.to_string())?;
    let params = DiffParams::new()
        .with_algorithm(algorithm)
        .with_threshold(args.threshold)
        .with_block_size(args.block_size);
    params.validate().map_err(|e| e.to_string())?;

    let mut reference = load(&args.reference)?;
    let mut candidate = load(&args.candidate)?;

    if args.normalize {
        normalize_pair(&mut reference, &mut candidate);
    }
    if args.extend {
        reference
            .extend_to_multiple(args.block_size)
            .and_then(|()| candidate.extend_to_multiple(args.block_size))
            .map_err(|e| e.to_string())?;
    }

    let output_path = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(output_file_name(
            method,
            &args.output_id,
            &reference,
            &candidate,
            algorithm,
        ))
    });
    let (width, height) = reference.dimensions();
    let candidate_name = candidate.name().to_string();

    let outcome = DiffSession::new(reference, candidate, params)
        .and_then(|session| session.run(method))
        .map_err(|e| e.to_string())?;

    log::info!("writing {}", output_path.display());
    outcome
        .output
        .save(&output_path)
        .map_err(|e| format!("failed to save '{}': {e}", output_path.display()))?;

    let report = Report {
        args,
        method,
        algorithm,
        output_path: &output_path,
        candidate_name: &candidate_name,
        width,
        height,
    };
    report.print(&outcome).map_err(|e| format!("failed to write report: {e}"))?;

    Ok(outcome)
}

fn load(path: &Path) -> Result<ImageHandle, String> {
    ImageHandle::open(path).map_err(|e| format!("failed to load '{}': {e}", path.display()))
}

fn get_format(args: &CompareArgs) -> OutputFormat {
    if args.json {
        OutputFormat::Json
    } else if args.quiet {
        OutputFormat::Count
    } else {
        args.format
    }
}

struct Report<'a> {
    args: &'a CompareArgs,
    method: Method,
    algorithm: HashAlgorithm,
    output_path: &'a Path,
    candidate_name: &'a str,
    width: u32,
    height: u32,
}

impl Report<'_> {
    fn print(&self, outcome: &DiffOutcome) -> io::Result<()> {
        let stats = &outcome.stats;
        let mut out = io::stdout().lock();

        match get_format(self.args) {
            OutputFormat::Count => {
                writeln!(out, "{}", stats.flagged)?;
            }
            OutputFormat::Text => {
                let flagged = if stats.flagged > 0 {
                    stats.flagged.to_string().red().bold()
                } else {
                    stats.flagged.to_string().green().bold()
                };
                writeln!(
                    out,
                    "Info: \tComparing {} with {} ({}x{}, {}, {})",
                    outcome.output.name(),
                    self.candidate_name,
                    self.width,
                    self.height,
                    self.method,
                    self.algorithm
                )?;
                writeln!(out, "Done: \tOutput saved as: {}", self.output_path.display())?;
                writeln!(out, "Done: \tTotal blocks compared: {}.", stats.examined)?;
                writeln!(out, "Done: \tNumber of blocks with dissimilarity: {flagged}")?;
                writeln!(
                    out,
                    "Done: \tAverage dissimilarity {:.2}%.",
                    stats.average_dissimilarity
                )?;
                writeln!(
                    out,
                    "Done: \tExecution time: {:.4} seconds",
                    stats.elapsed_seconds
                )?;
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    method: self.method.name(),
                    reference: outcome
                        .output
                        .path()
                        .unwrap_or(self.args.reference.as_path())
                        .display()
                        .to_string(),
                    candidate: self.args.candidate.display().to_string(),
                    output: self.output_path.display().to_string(),
                    width: self.width,
                    height: self.height,
                    params: JsonParams {
                        algorithm: self.algorithm.id(),
                        threshold: self.args.threshold,
                        block_size: self.args.block_size,
                    },
                    stats: JsonStats {
                        examined: stats.examined,
                        flagged: stats.flagged,
                        average_dissimilarity_percent: stats.average_dissimilarity,
                        elapsed_seconds: stats.elapsed_seconds,
                    },
                    blocks: outcome.blocks.iter().map(JsonBlock::from).collect(),
                };
                let json = serde_json::to_string_pretty(&output)
                    .map_err(io::Error::other)?;
                writeln!(out, "{json}")?;
            }
        }

        out.flush()
    }
}
