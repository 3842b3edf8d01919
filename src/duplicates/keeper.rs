//! Keeper selection for content-identical files.
//!
//! # Overview
//!
//! When two paths are known to hold identical bytes, exactly one of them
//! stays in place. The decision is made in two steps:
//!
//! 1. **Copy markers** - a base filename that contains `copy` or a `(`
//!    (case-insensitive) looks like an OS-generated duplicate such as
//!    `track (1).mp3` or `track - Copy.mp3`. If exactly one of the two
//!    names carries a marker, the other path is kept.
//! 2. **Lexicographic fallback** - otherwise the smaller full path string
//!    is kept.
//!
//! The policy is a total order on `(has_marker, path)`, so the outcome never
//! depends on which file the walker happened to visit first.
//!
//! # Example
//!
//! ```
//! use tunetidy::duplicates::choose_keeper;
//! use std::path::Path;
//!
//! let (keeper, loser) = choose_keeper(Path::new("track (1).mp3"), Path::new("track.mp3"));
//! assert_eq!(keeper, Path::new("track.mp3"));
//! assert_eq!(loser, Path::new("track (1).mp3"));
//! ```

use std::cmp::Ordering;
use std::path::Path;

/// Check whether a path's base filename looks like an OS-made copy.
#[must_use]
pub fn has_copy_marker(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.contains("copy") || name.contains('(')
}

/// Compare two full paths as strings, falling back to raw OS bytes.
fn compare_paths(a: &Path, b: &Path) -> Ordering {
    a.to_string_lossy()
        .cmp(&b.to_string_lossy())
        .then_with(|| a.as_os_str().cmp(b.as_os_str()))
}

/// Pick which of two content-identical paths survives.
///
/// Returns `(keeper, loser)`. Symmetric: swapping the arguments yields the
/// same keeper.
#[must_use]
pub fn choose_keeper<'a>(a: &'a Path, b: &'a Path) -> (&'a Path, &'a Path) {
    match (has_copy_marker(a), has_copy_marker(b)) {
        (true, false) => (b, a),
        (false, true) => (a, b),
        _ => {
            if compare_paths(a, b) == Ordering::Greater {
                (b, a)
            } else {
                (a, b)
            }
        }
    }
}
