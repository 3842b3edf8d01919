//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Keeper selection between content-identical files
//! - The seen-index scan that groups files by content digest
//! - Quarantining losers and recording each decision in a report

pub mod finder;
pub mod keeper;
pub mod report;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, SeenIndex};
pub use keeper::{choose_keeper, has_copy_marker};
pub use report::{session_timestamp, DuplicateEntry, DuplicateReport, MoveOutcome};
