//! Track renaming into `Artist - Title` form.
//!
//! Names come from tags when both artist and title are present, otherwise
//! from the injected [`NameSuggester`](crate::suggest::NameSuggester).
//! Every file ends up either renamed or skipped with a reason.

pub mod engine;
pub mod report;
pub mod sanitize;

pub use engine::{RenameConfig, RenameError, Renamer, DEFAULT_PATTERN};
pub use report::{RenameReport, RenameSource, RenamedTrack, SkipReason, SkippedTrack};
pub use sanitize::{already_correct_name, format_pattern, sanitize_component};
