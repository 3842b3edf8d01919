//! Duplicate scan report types.
//!
//! A [`DuplicateReport`] is created empty when a scan starts, receives one
//! [`DuplicateEntry`] per resolved collision, and is returned complete to
//! the caller. Entries are never mutated after they are appended.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::scanner::{hash_to_hex, Digest, ScanError};

/// Timestamp layout used for session directories and log file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Format a session timestamp (`YYYY-MM-DD_HH-MM-SS`).
#[must_use]
pub fn session_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// What happened when a losing duplicate was relocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file now lives in the quarantine directory.
    Moved,
    /// The move was attempted and failed; the file is still in place.
    Failed(String),
}

impl MoveOutcome {
    /// Whether the file was actually relocated.
    #[must_use]
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved)
    }
}

/// One resolved duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry {
    /// The path that stays in place.
    pub original: PathBuf,
    /// The path that was detected as the duplicate.
    pub duplicate: PathBuf,
    /// Where the duplicate now lives (`None` if the move failed).
    pub dupe_moved_to: Option<PathBuf>,
    /// Shared content digest.
    pub hash: Digest,
    /// Result of the relocation.
    pub outcome: MoveOutcome,
}

impl DuplicateEntry {
    /// Digest as a hex string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }
}

/// Result of one duplicate scan.
#[derive(Debug)]
pub struct DuplicateReport {
    /// The scanned root folder.
    pub folder: PathBuf,
    /// Session identifier; also the quarantine subfolder name.
    pub timestamp: String,
    /// The session quarantine directory.
    pub quarantine_dir: PathBuf,
    /// Resolved duplicates in the order they were found.
    pub duplicates_removed: Vec<DuplicateEntry>,
    /// Files that matched the extension filter and were hashed.
    pub files_scanned: usize,
    /// Distinct content digests seen (one keeper each).
    pub distinct_hashes: usize,
    /// Bytes relocated into quarantine.
    pub bytes_quarantined: u64,
    /// Files skipped because they could not be read.
    pub scan_errors: Vec<ScanError>,
    /// Whether the scan stopped early on a shutdown request.
    pub interrupted: bool,
}

impl DuplicateReport {
    /// Start an empty report for a session.
    #[must_use]
    pub fn new(folder: PathBuf, timestamp: String, quarantine_dir: PathBuf) -> Self {
        Self {
            folder,
            timestamp,
            quarantine_dir,
            duplicates_removed: Vec::new(),
            files_scanned: 0,
            distinct_hashes: 0,
            bytes_quarantined: 0,
            scan_errors: Vec::new(),
            interrupted: false,
        }
    }

    /// Number of duplicates that were relocated.
    #[must_use]
    pub fn moved_count(&self) -> usize {
        self.duplicates_removed
            .iter()
            .filter(|e| e.outcome.is_moved())
            .count()
    }

    /// Number of duplicates whose relocation failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.duplicates_removed.len() - self.moved_count()
    }

    /// True when every file was read and every move succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.scan_errors.is_empty() && self.failed_count() == 0 && !self.interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(outcome: MoveOutcome) -> DuplicateEntry {
        DuplicateEntry {
            original: PathBuf::from("/m/a.mp3"),
            duplicate: PathBuf::from("/m/b.mp3"),
            dupe_moved_to: outcome.is_moved().then(|| PathBuf::from("/trash/s/b.mp3")),
            hash: [7u8; 32],
            outcome,
        }
    }

    #[test]
    fn test_session_timestamp_format() {
        let at = Local.with_ymd_and_hms(2025, 9, 16, 21, 30, 5).unwrap();
        assert_eq!(session_timestamp(at), "2025-09-16_21-30-05");
    }

    #[test]
    fn test_counts_distinguish_moved_and_failed() {
        let mut report = DuplicateReport::new(
            PathBuf::from("/m"),
            "2025-01-01_00-00-00".to_string(),
            PathBuf::from("/trash/2025-01-01_00-00-00"),
        );
        assert!(report.is_clean());

        report.duplicates_removed.push(entry(MoveOutcome::Moved));
        report
            .duplicates_removed
            .push(entry(MoveOutcome::Failed("denied".to_string())));

        assert_eq!(report.moved_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_hash_hex() {
        assert_eq!(entry(MoveOutcome::Moved).hash_hex(), "07".repeat(32));
    }
}
