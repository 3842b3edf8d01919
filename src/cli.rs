//! Command-line interface definitions for tunetidy.
//!
//! Global options (verbosity, color, config file) apply to every subcommand.
//! Running without a subcommand opens the interactive menu.
//!
//! # Example
//!
//! ```bash
//! # Show artist/title tags
//! tunetidy tags ~/Music
//!
//! # Quarantine duplicate mp3 and flac files
//! tunetidy dupes ~/Music --ext mp3 --ext flac --trash-dir ~/Music-trash
//!
//! # Preview renames without touching anything
//! tunetidy rename ~/Music --dry-run
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Music library maintenance: tag inspection, duplicate quarantine and renaming.
#[derive(Debug, Parser)]
#[command(name = "tunetidy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (TOML). Defaults to the platform config dir.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute (interactive menu when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show artist and title tags of every track
    Tags(TagsArgs),
    /// Detect duplicate tracks and move them to quarantine
    Dupes(DupesArgs),
    /// Rename tracks to "Artist - Title"
    Rename(RenameArgs),
    /// Interactive menu
    Menu,
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for `tags`.
#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Folder to inspect
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Extensions to include (repeatable, overrides config)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,
}

/// Arguments for `dupes`.
#[derive(Debug, Args)]
pub struct DupesArgs {
    /// Folder to scan recursively
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Root of the quarantine area (a timestamped folder is created inside)
    #[arg(long, value_name = "DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Where to write the JSON and text logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Extensions to include (repeatable, overrides config)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Number of hashing threads
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Read size for hashing (e.g. 8KiB, 1MiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

/// Arguments for `rename`.
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Folder to process recursively
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Show what would be renamed without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Naming pattern using {artist} and {title}
    #[arg(long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Never ask the suggestion service; untagged files are skipped
    #[arg(long)]
    pub no_ai: bool,

    /// Where to write the JSON and text logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Extensions to include (repeatable, overrides config)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,
}

/// Parse a human-readable size string into bytes.
///
/// # Examples
///
/// ```
/// use tunetidy::cli::parse_size;
///
/// assert_eq!(parse_size("8192").unwrap(), 8192);
/// assert_eq!(parse_size("64KiB").unwrap(), 65536);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
