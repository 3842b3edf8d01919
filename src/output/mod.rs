//! Report logs written after each run.
//!
//! Every run leaves two files in the log directory:
//! - JSON for automation and scripting
//! - plain text for a human audit trail
//!
//! # Example
//!
//! ```no_run
//! use tunetidy::duplicates::DuplicateFinder;
//! use tunetidy::output::save_duplicate_log;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.scan(Path::new("music")).unwrap();
//!
//! let paths = save_duplicate_log(&report, Path::new("logs")).unwrap();
//! println!("{}\n{}", paths.json.display(), paths.txt.display());
//! ```

pub mod json;
pub mod text;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateReport;
use crate::rename::RenameReport;

pub use json::{JsonDuplicateReport, JsonRenameReport};

/// Where a pair of logs was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub json: PathBuf,
    pub txt: PathBuf,
}

/// Errors that can occur while writing logs.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing log: {0}")]
    Io(#[from] std::io::Error),

    /// The log directory could not be created.
    #[error("Cannot create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn log_paths(log_dir: &Path, prefix: &str, timestamp: &str) -> Result<LogPaths, OutputError> {
    fs::create_dir_all(log_dir).map_err(|source| OutputError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;
    let base = format!("{}_{}", prefix, timestamp);
    Ok(LogPaths {
        json: log_dir.join(format!("{}.json", base)),
        txt: log_dir.join(format!("{}.txt", base)),
    })
}

fn write_file<F>(path: &Path, body: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), OutputError>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    body(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Save a duplicate report as `duplicates_<timestamp>.json` and `.txt`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be written.
pub fn save_duplicate_log(report: &DuplicateReport, log_dir: &Path) -> Result<LogPaths, OutputError> {
    let paths = log_paths(log_dir, "duplicates", &report.timestamp)?;

    write_file(&paths.json, |w| {
        json::write_pretty(&JsonDuplicateReport::new(report), w)
    })?;
    write_file(&paths.txt, |w| Ok(text::write_duplicate_log(report, w)?))?;

    log::info!("Duplicate log saved to {}", paths.txt.display());
    Ok(paths)
}

/// Save a rename report as `renamed_<timestamp>.json` and `.txt`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be written.
pub fn save_rename_log(report: &RenameReport, log_dir: &Path) -> Result<LogPaths, OutputError> {
    let paths = log_paths(log_dir, "renamed", &report.timestamp)?;

    write_file(&paths.json, |w| {
        json::write_pretty(&JsonRenameReport::new(report), w)
    })?;
    write_file(&paths.txt, |w| Ok(text::write_rename_log(report, w)?))?;

    log::info!("Rename log saved to {}", paths.txt.display());
    Ok(paths)
}
