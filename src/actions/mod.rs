//! File actions module.
//!
//! This module provides the filesystem mutations performed by tunetidy:
//! - Relocating losing duplicates into a session quarantine directory
//! - Choosing collision-free destination names
//! - Moving files without overwriting an existing destination
//!
//! Nothing in this module deletes file content. Quarantined files stay on
//! disk until a human removes them.
//!
//! ```no_run
//! use tunetidy::actions::Quarantine;
//! use std::path::Path;
//!
//! let quarantine = Quarantine::create(Path::new("trash"), "2025-09-16_21-30-00").unwrap();
//! let result = quarantine.relocate(Path::new("music/track - Copy.mp3"));
//! ```

pub mod quarantine;

// Re-export commonly used types
pub use quarantine::{move_no_clobber, unique_path, Quarantine, QuarantineError};
