//! Duplicate finder: walk, fingerprint, resolve, quarantine.
//!
//! # Overview
//!
//! This module orchestrates one duplicate scan session:
//! 1. **Quarantine** - claim `<trash_dir>/<timestamp>/` before anything moves
//! 2. **Walk** - collect every file matching the extension filter
//! 3. **Hash** - fingerprint files on a bounded worker pool
//! 4. **Resolve** - feed digests, in walk order, through a single
//!    [`SeenIndex`]; every collision picks a keeper and quarantines the loser
//!
//! Only the resolve step touches the index or the filesystem, and it runs on
//! the calling thread, so keeper decisions and moves are strictly serialized.
//!
//! # Example
//!
//! ```no_run
//! use tunetidy::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default().with_trash_dir("trash".into());
//! let finder = DuplicateFinder::new(config);
//!
//! let report = finder.scan(Path::new("/home/user/Music")).unwrap();
//! println!("Quarantined {} duplicates", report.moved_count());
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::keeper::choose_keeper;
use super::report::{session_timestamp, DuplicateEntry, DuplicateReport, MoveOutcome};
use crate::actions::{Quarantine, QuarantineError};
use crate::progress::ProgressCallback;
use crate::scanner::{
    same_file, Digest, FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig,
};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration (extension filter, ignore patterns, ...).
    pub walker_config: WalkerConfig,
    /// Root directory for session quarantine folders.
    pub trash_dir: PathBuf,
    /// Read size used by the fingerprinter.
    pub chunk_size: usize,
    /// Number of hashing threads. Resolution is always single-threaded.
    pub io_threads: usize,
    /// Fixed session timestamp (defaults to the current local time).
    pub timestamp: Option<String>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("trash_dir", &self.trash_dir)
            .field("chunk_size", &self.chunk_size)
            .field("io_threads", &self.io_threads)
            .field("timestamp", &self.timestamp)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::with_extensions(["mp3"]),
            trash_dir: PathBuf::from("trash"),
            chunk_size: crate::scanner::DEFAULT_CHUNK_SIZE,
            io_threads: 4,
            timestamp: None,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the quarantine root.
    #[must_use]
    pub fn with_trash_dir(mut self, dir: PathBuf) -> Self {
        self.trash_dir = dir;
        self
    }

    /// Set the fingerprinter read size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of hashing threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Use a fixed session timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that abort a whole scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The session quarantine directory could not be created.
    #[error(transparent)]
    Quarantine(#[from] QuarantineError),
}

/// Outcome of presenting one fingerprinted file to the [`SeenIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// First file with this digest; it is now the keeper.
    Recorded,
    /// The digest was already known; `loser` must leave.
    Collision {
        /// Path that stays.
        keeper: PathBuf,
        /// Path to quarantine.
        loser: PathBuf,
    },
}

/// Mapping from content digest to the current best-known keeper.
///
/// Holds at most one path per digest. Scan-scoped; never persisted.
#[derive(Debug, Default)]
pub struct SeenIndex {
    entries: HashMap<Digest, PathBuf>,
}

impl SeenIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Present a file and apply the keeper policy on collision.
    ///
    /// The stored path is replaced when the newcomer wins, so the index
    /// always holds the current keeper rather than the first-seen path.
    /// Presenting the stored path again is not a collision.
    pub fn resolve(&mut self, hash: Digest, path: PathBuf) -> Resolution {
        match self.entries.entry(hash) {
            Entry::Vacant(slot) => {
                slot.insert(path);
                Resolution::Recorded
            }
            Entry::Occupied(slot) if *slot.get() == path => Resolution::Recorded,
            Entry::Occupied(mut slot) => {
                let (keeper, loser) = {
                    let (keeper, loser) = choose_keeper(slot.get(), &path);
                    (keeper.to_path_buf(), loser.to_path_buf())
                };
                if keeper != *slot.get() {
                    slot.insert(keeper.clone());
                }
                Resolution::Collision { keeper, loser }
            }
        }
    }

    /// Current keeper for a digest.
    #[must_use]
    pub fn keeper(&self, hash: &Digest) -> Option<&Path> {
        self.entries.get(hash).map(PathBuf::as_path)
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Duplicate finder that runs one scan session per call.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new().with_chunk_size(config.chunk_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Scan `root` recursively, quarantine duplicates and return the report.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the root does not exist, is not a directory,
    /// or the quarantine directory cannot be created. Per-file problems are
    /// recorded in the report instead.
    pub fn scan(&self, root: &Path) -> Result<DuplicateReport, FinderError> {
        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", root.display());
        let quarantine = self.open_quarantine()?;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let walker_config = self
            .config
            .walker_config
            .clone()
            .exclude_dir(self.config.trash_dir.clone());
        let mut walker = Walker::new(root, walker_config);
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        let mut walk_errors = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                    }
                    files.push(file);
                }
                Err(e) => walk_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }
        log::info!("Found {} candidate files", files.len());

        let mut report = self.resolve(root, files, quarantine);
        walk_errors.append(&mut report.scan_errors);
        report.scan_errors = walk_errors;
        Ok(report)
    }

    /// Resolve a pre-collected list of files, in the given order.
    ///
    /// Use this method when the files come from another source than the
    /// built-in walker. The quarantine directory is still created first.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Quarantine` if the session directory cannot be created.
    pub fn scan_files(
        &self,
        root: &Path,
        files: Vec<FileEntry>,
    ) -> Result<DuplicateReport, FinderError> {
        let quarantine = self.open_quarantine()?;
        Ok(self.resolve(root, files, quarantine))
    }

    fn open_quarantine(&self) -> Result<Quarantine, FinderError> {
        let timestamp = self
            .config
            .timestamp
            .clone()
            .unwrap_or_else(|| session_timestamp(chrono::Local::now()));
        Ok(Quarantine::create(&self.config.trash_dir, &timestamp)?)
    }

    /// Fingerprint every file, preserving input order.
    fn hash_all(&self, files: &[FileEntry]) -> Vec<Result<Digest, HashError>> {
        let done = AtomicUsize::new(0);
        let hash_one = |file: &FileEntry| {
            let result = self.hasher.hash_file(&file.path);
            if let Some(ref callback) = self.config.progress_callback {
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(n, &file.path.to_string_lossy());
                callback.on_item_completed(file.size);
            }
            result
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| files.par_iter().map(hash_one).collect()),
            Err(e) => {
                log::warn!("Failed to build hashing pool ({}), hashing sequentially", e);
                files.iter().map(hash_one).collect()
            }
        }
    }

    /// The single-writer stage: index updates and moves happen only here.
    fn resolve(
        &self,
        root: &Path,
        files: Vec<FileEntry>,
        quarantine: Quarantine,
    ) -> DuplicateReport {
        let mut report = DuplicateReport::new(
            root.to_path_buf(),
            quarantine.session().to_string(),
            quarantine.dir().to_path_buf(),
        );

        if self.config.is_shutdown_requested() {
            report.interrupted = true;
            return report;
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", files.len());
        }
        let hashes = self.hash_all(&files);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        let mut index = SeenIndex::new();
        for (file, hash) in files.into_iter().zip(hashes) {
            if self.config.is_shutdown_requested() {
                report.interrupted = true;
                break;
            }

            let hash = match hash {
                Ok(hash) => hash,
                Err(HashError::Interrupted(_)) => {
                    report.interrupted = true;
                    break;
                }
                Err(e) => {
                    log::warn!("Skipping unreadable file: {}", e);
                    report.scan_errors.push(ScanError::from(e));
                    continue;
                }
            };
            report.files_scanned += 1;

            if let Resolution::Collision { keeper, loser } = index.resolve(hash, file.path) {
                if same_file(&keeper, &loser) {
                    log::debug!(
                        "Not a duplicate, same file: {} and {}",
                        keeper.display(),
                        loser.display()
                    );
                    continue;
                }
                log::debug!("Duplicate: keeping {}, removing {}", keeper.display(), loser.display());
                let (dupe_moved_to, outcome) = match quarantine.relocate(&loser) {
                    Ok(destination) => {
                        report.bytes_quarantined += file.size;
                        (Some(destination), MoveOutcome::Moved)
                    }
                    Err(e) => (None, MoveOutcome::Failed(e.to_string())),
                };
                report.duplicates_removed.push(DuplicateEntry {
                    original: keeper,
                    duplicate: loser,
                    dupe_moved_to,
                    hash,
                    outcome,
                });
            }
        }

        report.distinct_hashes = index.len();
        log::info!(
            "Scan complete: {} files, {} distinct, {} quarantined, {} failed moves, {} errors",
            report.files_scanned,
            report.distinct_hashes,
            report.moved_count(),
            report.failed_count(),
            report.scan_errors.len()
        );
        report
    }
}
