//! JSON log formatter for duplicate and rename reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "folder": "/home/user/Music",
//!   "timestamp": "2025-09-16_21-30-00",
//!   "quarantine_dir": "trash/2025-09-16_21-30-00",
//!   "files_scanned": 3,
//!   "distinct_hashes": 2,
//!   "bytes_quarantined": 4096,
//!   "interrupted": false,
//!   "duplicates_removed": [
//!     {
//!       "original": "/home/user/Music/track.mp3",
//!       "duplicate": "/home/user/Music/track - Copy.mp3",
//!       "dupe_moved_to": "trash/2025-09-16_21-30-00/track - Copy.mp3",
//!       "hash": "abc123...",
//!       "outcome": { "status": "moved" }
//!     }
//!   ],
//!   "scan_errors": []
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::OutputError;
use crate::duplicates::{DuplicateEntry, DuplicateReport, MoveOutcome};
use crate::rename::{RenameReport, RenamedTrack, SkippedTrack};

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Move outcome in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JsonOutcome {
    Moved,
    Failed { error: String },
}

impl From<&MoveOutcome> for JsonOutcome {
    fn from(outcome: &MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Moved => Self::Moved,
            MoveOutcome::Failed(error) => Self::Failed {
                error: error.clone(),
            },
        }
    }
}

/// A single duplicate entry in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateEntry {
    pub original: String,
    pub duplicate: String,
    /// `null` when the move failed.
    pub dupe_moved_to: Option<String>,
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    pub outcome: JsonOutcome,
}

impl From<&DuplicateEntry> for JsonDuplicateEntry {
    fn from(entry: &DuplicateEntry) -> Self {
        Self {
            original: path_string(&entry.original),
            duplicate: path_string(&entry.duplicate),
            dupe_moved_to: entry.dupe_moved_to.as_deref().map(path_string),
            hash: entry.hash_hex(),
            outcome: JsonOutcome::from(&entry.outcome),
        }
    }
}

/// Complete duplicate log structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateReport {
    pub folder: String,
    pub timestamp: String,
    pub quarantine_dir: String,
    pub files_scanned: usize,
    pub distinct_hashes: usize,
    pub bytes_quarantined: u64,
    pub interrupted: bool,
    pub duplicates_removed: Vec<JsonDuplicateEntry>,
    pub scan_errors: Vec<String>,
}

impl JsonDuplicateReport {
    #[must_use]
    pub fn new(report: &DuplicateReport) -> Self {
        Self {
            folder: path_string(&report.folder),
            timestamp: report.timestamp.clone(),
            quarantine_dir: path_string(&report.quarantine_dir),
            files_scanned: report.files_scanned,
            distinct_hashes: report.distinct_hashes,
            bytes_quarantined: report.bytes_quarantined,
            interrupted: report.interrupted,
            duplicates_removed: report
                .duplicates_removed
                .iter()
                .map(JsonDuplicateEntry::from)
                .collect(),
            scan_errors: report.scan_errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A renamed track in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRenamedTrack {
    pub original: String,
    pub new_path: String,
    pub artist: String,
    pub title: String,
    /// `"tags"` or `"suggested"`.
    pub source: &'static str,
}

impl From<&RenamedTrack> for JsonRenamedTrack {
    fn from(track: &RenamedTrack) -> Self {
        Self {
            original: path_string(&track.original),
            new_path: path_string(&track.new_path),
            artist: track.artist.clone(),
            title: track.title.clone(),
            source: track.source.as_str(),
        }
    }
}

/// A skipped track in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSkippedTrack {
    pub original: String,
    pub reason: String,
}

impl From<&SkippedTrack> for JsonSkippedTrack {
    fn from(track: &SkippedTrack) -> Self {
        Self {
            original: path_string(&track.original),
            reason: track.reason.to_string(),
        }
    }
}

/// Complete rename log structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRenameReport {
    pub folder: String,
    pub timestamp: String,
    pub dry_run: bool,
    pub interrupted: bool,
    pub renamed_tracks: Vec<JsonRenamedTrack>,
    pub skipped_tracks: Vec<JsonSkippedTrack>,
}

impl JsonRenameReport {
    #[must_use]
    pub fn new(report: &RenameReport) -> Self {
        Self {
            folder: path_string(&report.folder),
            timestamp: report.timestamp.clone(),
            dry_run: report.dry_run,
            interrupted: report.interrupted,
            renamed_tracks: report
                .renamed_tracks
                .iter()
                .map(JsonRenamedTrack::from)
                .collect(),
            skipped_tracks: report
                .skipped_tracks
                .iter()
                .map(JsonSkippedTrack::from)
                .collect(),
        }
    }
}

/// Write any log structure as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_pretty<T: Serialize, W: Write>(value: &T, writer: &mut W) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}
