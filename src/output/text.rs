//! Human-readable audit logs.
//!
//! The text logs are meant to be skimmed: a short header, a 60-dash rule,
//! then one numbered block per entry.

use std::io::{self, Write};

use crate::duplicates::{DuplicateReport, MoveOutcome};
use crate::rename::RenameReport;

const RULE_WIDTH: usize = 60;

/// Write the duplicate audit log.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_duplicate_log<W: Write>(report: &DuplicateReport, w: &mut W) -> io::Result<()> {
    writeln!(w, "Duplicate Report")?;
    writeln!(w, "Folder   : {}", report.folder.display())?;
    writeln!(w, "Run      : {}", report.timestamp)?;
    writeln!(w, "Found    : {} duplicate(s)", report.duplicates_removed.len())?;
    if report.failed_count() > 0 {
        writeln!(w, "Failed   : {} move(s)", report.failed_count())?;
    }
    if !report.scan_errors.is_empty() {
        writeln!(w, "Errors   : {} unreadable file(s)", report.scan_errors.len())?;
    }
    if report.interrupted {
        writeln!(w, "Status   : interrupted")?;
    }
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(w)?;

    for (i, entry) in report.duplicates_removed.iter().enumerate() {
        writeln!(w, "[{}] HASH     : {}", i + 1, entry.hash_hex())?;
        writeln!(w, "    ORIGINAL : {}", entry.original.display())?;
        writeln!(w, "    DUPLICATE: {}", entry.duplicate.display())?;
        match (&entry.outcome, &entry.dupe_moved_to) {
            (MoveOutcome::Moved, Some(to)) => writeln!(w, "    MOVED TO : {}", to.display())?,
            (MoveOutcome::Failed(e), _) => writeln!(w, "    FAILED   : {}", e)?,
            (MoveOutcome::Moved, None) => writeln!(w, "    MOVED TO : <unknown>")?,
        }
        writeln!(w)?;
    }

    if report.duplicates_removed.is_empty() {
        writeln!(w, "No duplicates were detected in this run.")?;
    }

    if !report.scan_errors.is_empty() {
        writeln!(w)?;
        writeln!(w, "Unreadable files:")?;
        for (i, error) in report.scan_errors.iter().enumerate() {
            writeln!(w, "[{}] {}", i + 1, error)?;
        }
    }
    Ok(())
}

/// Write the rename audit log.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_rename_log<W: Write>(report: &RenameReport, w: &mut W) -> io::Result<()> {
    writeln!(w, "Rename Report")?;
    writeln!(w, "Folder   : {}", report.folder.display())?;
    writeln!(w, "Run      : {}", report.timestamp)?;
    if report.dry_run {
        writeln!(w, "Mode     : dry run (no files were changed)")?;
    }
    writeln!(w, "Renamed  : {} file(s)", report.renamed_tracks.len())?;
    writeln!(w, "Skipped  : {} file(s)", report.skipped_tracks.len())?;
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(w)?;

    for (i, track) in report.renamed_tracks.iter().enumerate() {
        writeln!(w, "[{}] {}", i + 1, track.original.display())?;
        writeln!(w, "    → {}", track.new_path.display())?;
        writeln!(w, "    Tags: {} - {}", track.artist, track.title)?;
        writeln!(w)?;
    }

    if report.skipped_tracks.is_empty() {
        writeln!(w, "No files were skipped.")?;
    } else {
        writeln!(w, "Skipped files:")?;
        for (i, track) in report.skipped_tracks.iter().enumerate() {
            writeln!(
                w,
                "[{}] {} (Reason: {})",
                i + 1,
                track.original.display(),
                track.reason
            )?;
        }
    }
    Ok(())
}
