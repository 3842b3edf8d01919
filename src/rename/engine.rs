//! Batch renamer: tags first, suggester as fallback.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::report::{RenameReport, RenameSource, RenamedTrack, SkipReason, SkippedTrack};
use super::sanitize::{already_correct_name, format_pattern, sanitize_component};
use crate::actions::{move_no_clobber, unique_path};
use crate::duplicates::session_timestamp;
use crate::progress::ProgressCallback;
use crate::scanner::{Walker, WalkerConfig};
use crate::suggest::NameSuggester;
use crate::tags::TagReader;

/// Default naming pattern.
pub const DEFAULT_PATTERN: &str = "{artist} - {title}";

/// Placeholder stored in the report when a suggested rename has no tag value.
const SUGGESTED_PLACEHOLDER: &str = "AI Suggested";

/// Errors that abort a whole rename run.
#[derive(thiserror::Error, Debug)]
pub enum RenameError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Rename run configuration.
#[derive(Clone)]
pub struct RenameConfig {
    /// Naming pattern with `{artist}` and `{title}` placeholders.
    pub pattern: String,
    /// Extensions to process.
    pub extensions: Vec<String>,
    /// Report what would happen without touching any file.
    pub dry_run: bool,
    /// Fixed run timestamp (defaults to the current local time).
    pub timestamp: Option<String>,
    /// Directory never walked, normally the duplicate quarantine.
    pub trash_dir: Option<PathBuf>,
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for RenameConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenameConfig")
            .field("pattern", &self.pattern)
            .field("extensions", &self.extensions)
            .field("dry_run", &self.dry_run)
            .field("timestamp", &self.timestamp)
            .field("trash_dir", &self.trash_dir)
            .finish_non_exhaustive()
    }
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            extensions: vec!["mp3".to_string(), "wav".to_string()],
            dry_run: false,
            timestamp: None,
            trash_dir: None,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl RenameConfig {
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = crate::scanner::normalize_extensions(extensions);
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn with_trash_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trash_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Renames tracks in a folder tree.
pub struct Renamer {
    config: RenameConfig,
    tags: Arc<dyn TagReader>,
    suggester: Arc<dyn NameSuggester>,
}

/// What to do with one file.
enum Decision {
    Rename(RenamedTrack),
    Skip(SkipReason),
}

impl Renamer {
    #[must_use]
    pub fn new(
        config: RenameConfig,
        tags: Arc<dyn TagReader>,
        suggester: Arc<dyn NameSuggester>,
    ) -> Self {
        Self {
            config,
            tags,
            suggester,
        }
    }

    /// Rename every matching file under `folder`.
    ///
    /// The file list is collected before the first rename, so renamed files
    /// are never visited twice.
    ///
    /// # Errors
    ///
    /// Returns `RenameError` if `folder` is missing or not a directory.
    /// Per-file problems become skips in the report.
    pub fn rename_all(&self, folder: &Path) -> Result<RenameReport, RenameError> {
        if !folder.exists() {
            return Err(RenameError::PathNotFound(folder.to_path_buf()));
        }
        if !folder.is_dir() {
            return Err(RenameError::NotADirectory(folder.to_path_buf()));
        }

        let timestamp = self
            .config
            .timestamp
            .clone()
            .unwrap_or_else(|| session_timestamp(chrono::Local::now()));
        let mut report = RenameReport::new(folder.to_path_buf(), timestamp, self.config.dry_run);

        let mut walker_config = WalkerConfig::with_extensions(&self.config.extensions);
        if let Some(trash_dir) = &self.config.trash_dir {
            walker_config = walker_config.exclude_dir(trash_dir.clone());
        }
        let walker = Walker::new(folder, walker_config);
        let files: Vec<PathBuf> = walker
            .walk()
            .filter_map(|entry| match entry {
                Ok(file) => Some(file.path),
                Err(e) => {
                    log::warn!("Skipping {}", e);
                    None
                }
            })
            .collect();

        log::info!(
            "Renaming {} files in {}{}",
            files.len(),
            folder.display(),
            if self.config.dry_run { " (dry run)" } else { "" }
        );
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("renaming", files.len());
        }

        for (i, path) in files.into_iter().enumerate() {
            if self
                .config
                .shutdown_flag
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
            {
                report.interrupted = true;
                break;
            }
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(i + 1, &path.to_string_lossy());
            }

            match self.process(&path) {
                Decision::Rename(track) => {
                    log::debug!("{} -> {}", path.display(), track.new_path.display());
                    report.renamed_tracks.push(track);
                }
                Decision::Skip(reason) => {
                    log::debug!("Skipped {}: {}", path.display(), reason);
                    report.skipped_tracks.push(SkippedTrack {
                        original: path,
                        reason,
                    });
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("renaming");
        }
        Ok(report)
    }

    fn process(&self, path: &Path) -> Decision {
        let tags = self.tags.read_tags(path);
        match (tags.artist.as_deref(), tags.title.as_deref()) {
            (Some(artist), Some(title)) => self.from_tags(path, artist, title),
            (artist, title) => self.from_suggestion(path, artist, title),
        }
    }

    fn from_tags(&self, path: &Path, artist: &str, title: &str) -> Decision {
        let safe_artist = sanitize_component(artist);
        let safe_title = sanitize_component(title);

        let mut new_name = format_pattern(&self.config.pattern, &safe_artist, &safe_title);
        if new_name.is_empty() {
            return Decision::Skip(SkipReason::EmptyName);
        }
        if new_name.contains(['/', '\\']) {
            return Decision::Skip(SkipReason::InvalidPattern);
        }
        let ext = dotted_extension(path);
        if !new_name.to_lowercase().ends_with(&ext.to_lowercase()) {
            new_name.push_str(&ext);
        }

        if already_correct_name(path, &safe_artist, &safe_title) {
            return Decision::Skip(SkipReason::AlreadyFormatted);
        }

        let target = sibling(path, &new_name);
        if target.exists() {
            return Decision::Skip(SkipReason::TargetExists);
        }

        match self.apply(path, &target) {
            Ok(()) => Decision::Rename(RenamedTrack {
                original: path.to_path_buf(),
                new_path: target,
                artist: artist.to_string(),
                title: title.to_string(),
                source: RenameSource::Tags,
            }),
            Err(reason) => Decision::Skip(reason),
        }
    }

    fn from_suggestion(
        &self,
        path: &Path,
        artist_hint: Option<&str>,
        title_hint: Option<&str>,
    ) -> Decision {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(name) = self
            .suggester
            .suggest(&filename, artist_hint, title_hint)
            .map(|s| sanitize_component(&s))
            .filter(|s| !s.is_empty())
        else {
            return Decision::Skip(SkipReason::NoSuggestion);
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if stem.trim() == name.to_lowercase() {
            return Decision::Skip(SkipReason::AlreadyFormatted);
        }

        let target = unique_path(&sibling(path, &format!("{}{}", name, dotted_extension(path))));

        let (split_artist, split_title) = match name.split_once(" - ") {
            Some((a, t)) => (Some(a), Some(t)),
            None => (None, None),
        };
        match self.apply(path, &target) {
            Ok(()) => Decision::Rename(RenamedTrack {
                original: path.to_path_buf(),
                new_path: target,
                artist: artist_hint
                    .or(split_artist)
                    .unwrap_or(SUGGESTED_PLACEHOLDER)
                    .to_string(),
                title: title_hint
                    .or(split_title)
                    .unwrap_or(SUGGESTED_PLACEHOLDER)
                    .to_string(),
                source: RenameSource::Suggested,
            }),
            Err(reason) => Decision::Skip(reason),
        }
    }

    fn apply(&self, from: &Path, to: &Path) -> Result<(), SkipReason> {
        if self.config.dry_run {
            return Ok(());
        }
        move_no_clobber(from, to).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => SkipReason::TargetExists,
            _ => SkipReason::RenameFailed(e.to_string()),
        })
    }
}

/// The original extension with its dot (`".mp3"`), or empty.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    path.parent()
        .unwrap_or_else(|| Path::new(""))
        .join(OsStr::new(name))
}
