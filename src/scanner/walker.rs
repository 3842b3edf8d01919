//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a music
//! folder and yielding every file that matches the configured extension
//! filter. The walk is a complete, single pass; directory children are
//! visited in file-name order so repeated runs see files in the same order.
//!
//! # Features
//!
//! - Extension filtering (case-insensitive)
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden file filtering
//! - Excluded directories (the quarantine area is never rescanned)
//! - Each physical file yielded once, even when hard links or followed
//!   symlinks reach it through several paths
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use tunetidy::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Music"), WalkerConfig::with_extensions(["mp3"]));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::WalkDir;

use super::hardlink::HardlinkTracker;
use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build gitignore matcher from config patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Canonical forms of the excluded directories that currently exist.
    fn canonical_exclusions(&self) -> Vec<PathBuf> {
        self.config
            .excluded_dirs
            .iter()
            .filter_map(|dir| canonical(dir))
            .collect()
    }

    /// Walk the directory tree, yielding matching file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let gitignore = self.build_gitignore();
        let exclusions = self.canonical_exclusions();
        let skip_hidden = self.config.skip_hidden;
        let mut hardlinks = HardlinkTracker::new();
        let root = self.root.clone();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if skip_hidden && is_hidden(entry.file_name()) {
                    return false;
                }
                let is_dir = entry.file_type().is_dir();
                if is_dir && !exclusions.is_empty() {
                    if let Some(resolved) = canonical(entry.path()) {
                        if exclusions.iter().any(|ex| *ex == resolved) {
                            log::debug!("Skipping excluded directory: {}", entry.path().display());
                            return false;
                        }
                    }
                }
                if let Some(ref gi) = gitignore {
                    let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                    if gi.matched(relative, is_dir).is_ignore() {
                        log::trace!("Ignoring: {}", entry.path().display());
                        return false;
                    }
                }
                true
            });

        walk_dir
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }
                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }
                    if !self.config.matches_extension(entry.path()) {
                        return None;
                    }

                    let metadata = match entry.metadata() {
                        Ok(m) => m,
                        Err(e) => {
                            let path = entry.path().to_path_buf();
                            return Some(Err(self.handle_walk_error(path, e)));
                        }
                    };
                    if !metadata.is_file() {
                        return None;
                    }
                    if hardlinks.is_hardlink(&metadata) {
                        log::debug!("Skipping hardlink or alias: {}", entry.path().display());
                        return None;
                    }

                    Some(Ok(FileEntry::new(entry.into_path(), metadata.len())))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    Some(Err(self.handle_walk_error(path, e)))
                }
            })
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, path: PathBuf, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                ScanError::Io {
                    path,
                    source: std::io::Error::other(error.to_string()),
                }
            }
        }
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

fn canonical(path: &Path) -> Option<PathBuf> {
    std::fs::canonicalize(path).ok()
}
