//! CLI argument definitions for `h41`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `discover` | List recent dates with a published edition |
//! | `fetch` | Fetch and validate one edition |
//! | `extract` | Extract fields from an edition, fetched or local |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--base-url` | publisher | Release root, also `H41_BASE_URL` |
//! | `--timeout-ms` | `5000` | Per-request timeout, also `H41_TIMEOUT_MS` |
//! | `-v` | off | Log progress to stderr (`-vv` for debug) |
//!
//! # Examples
//!
//! ```bash
//! h41 discover --count 4
//! h41 fetch 2026-01-08 --out edition.html
//! h41 extract 2026-01-08 --history history.json --record --pretty
//! h41 extract 2026-01-08 --html saved.html --format table
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Weekly H.4.1 release discovery and extraction.
#[derive(Debug, Parser)]
#[command(name = "h41", author, version, about = "Weekly H.4.1 release discovery and extraction")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Release root URL; overrides `H41_BASE_URL`.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds; overrides `H41_TIMEOUT_MS`.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Increase log verbosity on stderr.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON envelope.
    Json,
    /// Plain text for terminals.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the most recent dates that have a published edition.
    Discover(DiscoverArgs),

    /// Fetch one edition and confirm it is a genuine release page.
    Fetch(FetchArgs),

    /// Extract the field catalog from one edition.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Number of edition dates to find.
    #[arg(long, default_value_t = 4)]
    pub count: usize,

    /// Calendar days to walk back from the anchor.
    #[arg(long, default_value_t = 60)]
    pub lookback_days: u32,

    /// Days probed per window.
    #[arg(long)]
    pub window_days: Option<u32>,

    /// Simultaneous probes within a window.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Publication date, YYYY-MM-DD.
    pub date: String,

    /// Write the validated HTML to this path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Publication date, YYYY-MM-DD.
    pub date: String,

    /// Read edition HTML from a file instead of fetching it.
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// JSON file of prior snapshots used for year-over-year comparison.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Append this edition's snapshot to `--history`.
    #[arg(long, requires = "history", default_value_t = false)]
    pub record: bool,

    /// Include the per-field validation report.
    #[arg(long, default_value_t = false)]
    pub report: bool,
}
