//! Rename run report types.

use std::fmt;
use std::path::PathBuf;

/// Where a new name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameSource {
    /// Built from the file's artist and title tags.
    Tags,
    /// Suggested by the name suggester because tags were missing.
    Suggested,
}

impl RenameSource {
    /// Lowercase label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Suggested => "suggested",
        }
    }
}

/// A file that was renamed (or would be, under dry run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedTrack {
    pub original: PathBuf,
    pub new_path: PathBuf,
    pub artist: String,
    pub title: String,
    pub source: RenameSource,
}

/// Why a file was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyName,
    InvalidPattern,
    AlreadyFormatted,
    TargetExists,
    NoSuggestion,
    RenameFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => f.write_str("empty name after sanitize"),
            Self::InvalidPattern => f.write_str("pattern produced an invalid file name"),
            Self::AlreadyFormatted => f.write_str("already formatted correctly"),
            Self::TargetExists => f.write_str("target file already exists"),
            Self::NoSuggestion => f.write_str("missing tags + AI failed"),
            Self::RenameFailed(e) => write!(f, "rename failed: {}", e),
        }
    }
}

/// A file that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    pub original: PathBuf,
    pub reason: SkipReason,
}

/// Result of one rename run.
#[derive(Debug)]
pub struct RenameReport {
    /// The processed folder.
    pub folder: PathBuf,
    /// Run timestamp (`YYYY-MM-DD_HH-MM-SS`).
    pub timestamp: String,
    /// Whether the run only simulated renames.
    pub dry_run: bool,
    pub renamed_tracks: Vec<RenamedTrack>,
    pub skipped_tracks: Vec<SkippedTrack>,
    /// Whether the run stopped early on a shutdown request.
    pub interrupted: bool,
}

impl RenameReport {
    #[must_use]
    pub fn new(folder: PathBuf, timestamp: String, dry_run: bool) -> Self {
        Self {
            folder,
            timestamp,
            dry_run,
            renamed_tracks: Vec::new(),
            skipped_tracks: Vec::new(),
            interrupted: false,
        }
    }

    /// Number of renames whose name came from the suggester.
    #[must_use]
    pub fn suggested_count(&self) -> usize {
        self.renamed_tracks
            .iter()
            .filter(|t| t.source == RenameSource::Suggested)
            .count()
    }

    /// Number of skips caused by a failing filesystem rename.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.skipped_tracks
            .iter()
            .filter(|t| matches!(t.reason, SkipReason::RenameFailed(_)))
            .count()
    }
}
