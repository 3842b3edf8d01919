//! Physical file identity.
//!
//! One file on disk can be reached through several paths: hard links, a
//! file symlink, or a symlinked directory when links are followed. Those
//! paths share their bytes but are not duplicates, and moving one of them
//! into quarantine would pull the only copy out of the library.
//!
//! On Unix the identity is the `(device, inode)` pair. Other platforms have
//! no cheap identity in [`Metadata`], so every path counts as its own file
//! there and [`same_file`] falls back to comparing canonical paths.

use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::path::Path;

/// `(device, inode)` of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    dev: u64,
    ino: u64,
}

impl FileId {
    /// Identity from already-fetched metadata, if the platform exposes one.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Remembers the files seen during one walk.
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    seen: HashSet<FileId>,
}

impl HardlinkTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the file behind `metadata`; `true` if it was already seen
    /// under another path.
    pub fn is_hardlink(&mut self, metadata: &Metadata) -> bool {
        match FileId::from_metadata(metadata) {
            Some(id) => !self.seen.insert(id),
            None => false,
        }
    }

    /// Number of distinct files recorded.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Whether two paths name the same physical file (links followed).
///
/// Unreadable paths are never the same file.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    let (Ok(meta_a), Ok(meta_b)) = (fs::metadata(a), fs::metadata(b)) else {
        return false;
    };
    match (FileId::from_metadata(&meta_a), FileId::from_metadata(&meta_b)) {
        (Some(id_a), Some(id_b)) => id_a == id_b,
        _ => match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        },
    }
}
