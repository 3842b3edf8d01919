//! Session quarantine: non-destructive removal of duplicates.
//!
//! # Overview
//!
//! Losing duplicates are never deleted. They are moved into a per-session
//! directory `<trash_root>/<timestamp>/`, which is created once before the
//! scan starts and never purged by this tool.
//!
//! # Safety
//!
//! - The session directory is claimed with `create_dir`, so two scans that
//!   start in the same second get distinct directories (`<ts>_1`, `<ts>_2`, ...).
//! - Destinations are reserved with `create_new` before the move, so an
//!   existing file in quarantine is never overwritten; colliding names get a
//!   ` (1)`, ` (2)`, ... suffix.
//! - When a plain rename fails (for example across filesystems) the file is
//!   copied and the source removed; if the source cannot be removed, the copy
//!   is discarded and the move is reported as failed.
//!
//! # Example
//!
//! ```no_run
//! use tunetidy::actions::Quarantine;
//! use std::path::Path;
//!
//! let quarantine = Quarantine::create(Path::new("trash"), "2025-09-16_21-30-00").unwrap();
//! let moved_to = quarantine.relocate(Path::new("music/track (1).mp3")).unwrap();
//! println!("moved to {}", moved_to.display());
//! ```

use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Upper bound on suffix attempts for session directories and file names.
const MAX_SUFFIX_ATTEMPTS: usize = 10_000;

/// Error type for quarantine operations.
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// The quarantine root or session directory could not be created.
    #[error("cannot create quarantine directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file to relocate no longer exists.
    #[error("source file not found: {0}")]
    SourceMissing(PathBuf),

    /// The session directory vanished after it was created.
    #[error("quarantine directory missing: {0}")]
    DirectoryMissing(PathBuf),

    /// The path has no file name component.
    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),

    /// No free destination name was found.
    #[error("no free destination name for {0}")]
    NoFreeName(PathBuf),

    /// The move itself failed.
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A session-scoped quarantine directory.
#[derive(Debug, Clone)]
pub struct Quarantine {
    dir: PathBuf,
    session: String,
}

impl Quarantine {
    /// Create (claim) the session directory under `trash_root`.
    ///
    /// # Errors
    ///
    /// Returns [`QuarantineError::CreateDir`] if the root or the session
    /// directory cannot be created.
    pub fn create(trash_root: &Path, timestamp: &str) -> Result<Self, QuarantineError> {
        fs::create_dir_all(trash_root).map_err(|source| QuarantineError::CreateDir {
            path: trash_root.to_path_buf(),
            source,
        })?;

        for attempt in 0..MAX_SUFFIX_ATTEMPTS {
            let session = if attempt == 0 {
                timestamp.to_string()
            } else {
                format!("{timestamp}_{attempt}")
            };
            let dir = trash_root.join(&session);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    log::debug!("Created quarantine directory {}", dir.display());
                    return Ok(Self { dir, session });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(QuarantineError::CreateDir { path: dir, source }),
            }
        }

        Err(QuarantineError::CreateDir {
            path: trash_root.join(timestamp),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "session names exhausted"),
        })
    }

    /// The session directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The session name actually claimed (timestamp plus optional suffix).
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Move a file into the session directory, keeping its base name.
    ///
    /// Returns the destination actually used.
    ///
    /// # Errors
    ///
    /// Returns a [`QuarantineError`] if the source is gone, the session
    /// directory is missing, or the move fails. On error the source file is
    /// left where it was.
    pub fn relocate(&self, path: &Path) -> Result<PathBuf, QuarantineError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| QuarantineError::NoFileName(path.to_path_buf()))?;

        match fs::symlink_metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(QuarantineError::SourceMissing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(QuarantineError::Move {
                    from: path.to_path_buf(),
                    to: self.dir.clone(),
                    source,
                });
            }
        }
        if !self.dir.is_dir() {
            return Err(QuarantineError::DirectoryMissing(self.dir.clone()));
        }

        let destination = reserve_destination(&self.dir, file_name)?;
        match move_file(path, &destination) {
            Ok(()) => {
                log::info!("Quarantined {} -> {}", path.display(), destination.display());
                Ok(destination)
            }
            Err(source) => {
                let _ = fs::remove_file(&destination);
                log::warn!("Failed to quarantine {}: {}", path.display(), source);
                Err(QuarantineError::Move {
                    from: path.to_path_buf(),
                    to: destination,
                    source,
                })
            }
        }
    }
}

/// Candidate name number `n` for a file: `name.ext`, `name (1).ext`, ...
fn numbered_name(file_name: &OsStr, n: usize) -> OsString {
    if n == 0 {
        return file_name.to_os_string();
    }
    let path = Path::new(file_name);
    let stem = path.file_stem().unwrap_or(file_name).to_string_lossy();
    match path.extension() {
        Some(ext) => OsString::from(format!("{stem} ({n}).{}", ext.to_string_lossy())),
        None => OsString::from(format!("{stem} ({n})")),
    }
}

/// Return `target` if nothing exists there, else the first free
/// `stem (n).ext` sibling.
#[must_use]
pub fn unique_path(target: &Path) -> PathBuf {
    let Some(file_name) = target.file_name() else {
        return target.to_path_buf();
    };
    let parent = target.parent().unwrap_or_else(|| Path::new(""));

    (0..MAX_SUFFIX_ATTEMPTS)
        .map(|n| parent.join(numbered_name(file_name, n)))
        .find(|candidate| fs::symlink_metadata(candidate).is_err())
        .unwrap_or_else(|| target.to_path_buf())
}

/// Atomically claim a free destination name inside `dir` by creating an
/// empty placeholder file.
fn reserve_destination(dir: &Path, file_name: &OsStr) -> Result<PathBuf, QuarantineError> {
    for n in 0..MAX_SUFFIX_ATTEMPTS {
        let candidate = dir.join(numbered_name(file_name, n));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => {
                if n > 0 {
                    log::debug!("Quarantine name collision, using {}", candidate.display());
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(QuarantineError::DirectoryMissing(dir.to_path_buf()));
            }
            Err(source) => {
                return Err(QuarantineError::Move {
                    from: PathBuf::from(file_name),
                    to: candidate,
                    source,
                });
            }
        }
    }
    Err(QuarantineError::NoFreeName(dir.join(file_name)))
}

/// Move `from` to `to` without ever replacing an existing file at `to`.
///
/// The destination is claimed with `create_new` before the move, so a file
/// that appears at `to` after any earlier existence check makes this fail
/// with [`io::ErrorKind::AlreadyExists`] instead of being overwritten.
///
/// # Errors
///
/// Returns the I/O error from claiming the destination or from the move. On
/// error `from` is left in place and the placeholder is removed.
pub fn move_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    OpenOptions::new().write(true).create_new(true).open(to)?;
    move_file(from, to).inspect_err(|_| {
        let _ = fs::remove_file(to);
    })
}

/// Move `from` onto the reserved placeholder at `to`.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
        Err(rename_err) => {
            log::debug!(
                "Rename {} -> {} failed ({}), falling back to copy",
                from.display(),
                to.display(),
                rename_err
            );
            fs::copy(from, to)?;
            if let Err(remove_err) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(remove_err);
            }
            Ok(())
        }
    }
}
