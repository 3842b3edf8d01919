//! Command runners shared by the CLI subcommands and the interactive menu.
//!
//! Each runner takes the effective [`Config`], does its work, prints a
//! colored summary to `out` and returns the process exit code.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytesize::ByteSize;
use yansi::Paint;

use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateReport, FinderConfig, MoveOutcome};
use crate::error::ExitCode;
use crate::output::{save_duplicate_log, save_rename_log, LogPaths};
use crate::progress::Progress;
use crate::rename::{RenameConfig, RenameReport, RenameSource, Renamer};
use crate::scanner::{normalize_extensions, WalkerConfig};
use crate::signal::ShutdownHandler;
use crate::suggest::{
    CachedSuggester, NameSuggester, NoSuggester, OpenAiBackend, SuggestionCache,
};
use crate::tags::{inspect_tags, LoftyTagReader};

const RULE: &str = "------------------------------------------------------------";

/// Shared state for one invocation.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Config,
    pub quiet: bool,
    pub shutdown: ShutdownHandler,
}

impl App {
    #[must_use]
    pub fn new(config: Config, quiet: bool, shutdown: ShutdownHandler) -> Self {
        Self {
            config,
            quiet,
            shutdown,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_log_paths(out: &mut dyn Write, paths: &LogPaths) -> std::io::Result<()> {
    writeln!(out, "Logs saved at:")?;
    writeln!(out, "- {}", paths.json.display())?;
    writeln!(out, "- {}", paths.txt.display())
}

/// Print artist and title of every track under `folder`.
///
/// # Errors
///
/// Fails if `folder` is missing or not a directory.
pub fn inspect(app: &App, folder: &Path, out: &mut dyn Write) -> Result<ExitCode> {
    writeln!(out, "\n📂 Scanning folder: {}", folder.display())?;

    let rows = inspect_tags(folder, &LoftyTagReader::new(), &app.config.rename_extensions)
        .with_context(|| format!("Cannot inspect {}", folder.display()))?;

    for row in &rows {
        writeln!(out, "\n🎵 {}", file_name(&row.path).bold())?;
        writeln!(out, "{}", "-".repeat(40))?;
        writeln!(out, "Artist : {}", row.artist_display())?;
        writeln!(out, "Title  : {}", row.title_display())?;
    }

    writeln!(out, "\n{} Tag inspection complete ({} files).\n", "✅".green(), rows.len())?;
    Ok(ExitCode::Success)
}

/// Exit code for a finished duplicate scan.
#[must_use]
pub fn duplicate_exit_code(report: &DuplicateReport) -> ExitCode {
    if report.interrupted {
        ExitCode::Interrupted
    } else if !report.scan_errors.is_empty() || report.failed_count() > 0 {
        ExitCode::PartialSuccess
    } else if report.duplicates_removed.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}

/// Scan `folder` for duplicates, quarantine them and write the logs.
///
/// # Errors
///
/// Fails if the folder is invalid, the quarantine directory cannot be
/// created, or the logs cannot be written.
pub fn detect_duplicates(app: &App, folder: &Path, out: &mut dyn Write) -> Result<ExitCode> {
    let config = &app.config;
    let walker_config = WalkerConfig {
        extensions: normalize_extensions(&config.extensions),
        follow_symlinks: config.follow_symlinks,
        skip_hidden: config.skip_hidden,
        ignore_patterns: config.ignore_patterns.clone(),
        excluded_dirs: Vec::new(),
    };
    let finder_config = FinderConfig::default()
        .with_walker_config(walker_config)
        .with_trash_dir(config.trash_dir.clone())
        .with_chunk_size(config.chunk_size)
        .with_io_threads(config.io_threads)
        .with_shutdown_flag(app.shutdown.get_flag())
        .with_progress_callback(Arc::new(Progress::new(app.quiet)));

    let report = DuplicateFinder::new(finder_config)
        .scan(folder)
        .with_context(|| format!("Duplicate scan of {} failed", folder.display()))?;
    let paths = save_duplicate_log(&report, &config.log_dir)
        .context("Failed to write duplicate log")?;

    if !app.quiet {
        print_duplicate_summary(&report, &paths, out)?;
    }
    Ok(duplicate_exit_code(&report))
}

fn print_duplicate_summary(
    report: &DuplicateReport,
    paths: &LogPaths,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    for entry in &report.duplicates_removed {
        match &entry.outcome {
            MoveOutcome::Moved => writeln!(
                out,
                "{} {} (kept {})",
                "🗑  Quarantined:".blue(),
                file_name(&entry.duplicate),
                file_name(&entry.original)
            )?,
            MoveOutcome::Failed(e) => writeln!(
                out,
                "{} {}: {}",
                "⚠️ Move failed:".yellow(),
                entry.duplicate.display(),
                e
            )?,
        }
    }
    for error in &report.scan_errors {
        writeln!(out, "{} {}", "⚠️ Unreadable:".yellow(), error)?;
    }

    writeln!(out, "\n{}", RULE)?;
    writeln!(
        out,
        "{} Scanned {} files, {} distinct",
        "✅".green(),
        report.files_scanned,
        report.distinct_hashes
    )?;
    writeln!(
        out,
        "{} Quarantined {} duplicate(s) ({}) in {}",
        "✅".green(),
        report.moved_count(),
        ByteSize(report.bytes_quarantined),
        report.quarantine_dir.display()
    )?;
    if report.failed_count() > 0 || !report.scan_errors.is_empty() {
        writeln!(
            out,
            "{} {} failed move(s), {} unreadable file(s)",
            "⚠️".yellow(),
            report.failed_count(),
            report.scan_errors.len()
        )?;
    }
    if report.interrupted {
        writeln!(out, "{}", "Interrupted: the report covers only the files processed so far.".yellow())?;
    }
    writeln!(out, "{}\n", RULE)?;
    print_log_paths(out, paths)
}

/// Pick the name suggester for a rename run.
///
/// Falls back to [`NoSuggester`] when suggestions are disabled or no API
/// key is available.
#[must_use]
pub fn build_suggester(config: &Config, no_ai: bool) -> Arc<dyn NameSuggester> {
    if no_ai || !config.suggester.enabled {
        log::info!("Name suggestions disabled");
        return Arc::new(NoSuggester);
    }
    match OpenAiBackend::new(&config.suggester.openai()) {
        Ok(backend) => {
            let cache = SuggestionCache::load(&config.suggester.resolved_cache_path());
            Arc::new(CachedSuggester::new(backend, cache))
        }
        Err(e) => {
            log::warn!("Name suggestions unavailable: {}", e);
            Arc::new(NoSuggester)
        }
    }
}

/// Exit code for a finished rename run.
#[must_use]
pub fn rename_exit_code(report: &RenameReport) -> ExitCode {
    if report.interrupted {
        ExitCode::Interrupted
    } else if report.failed_count() > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}

/// Rename every track under `folder` and write the logs.
///
/// # Errors
///
/// Fails if the folder is invalid or the logs cannot be written.
pub fn rename_tracks(
    app: &App,
    folder: &Path,
    dry_run: bool,
    suggester: Arc<dyn NameSuggester>,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let config = &app.config;
    let rename_config = RenameConfig::default()
        .with_pattern(config.rename_pattern.clone())
        .with_extensions(&config.rename_extensions)
        .with_dry_run(dry_run)
        .with_trash_dir(config.trash_dir.clone())
        .with_shutdown_flag(app.shutdown.get_flag())
        .with_progress_callback(Arc::new(Progress::new(app.quiet)));

    let renamer = Renamer::new(rename_config, Arc::new(LoftyTagReader::new()), suggester);
    let report = renamer
        .rename_all(folder)
        .with_context(|| format!("Rename of {} failed", folder.display()))?;
    let paths = save_rename_log(&report, &config.log_dir).context("Failed to write rename log")?;

    if !app.quiet {
        print_rename_summary(&report, &paths, out)?;
    }
    Ok(rename_exit_code(&report))
}

fn print_rename_summary(
    report: &RenameReport,
    paths: &LogPaths,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let verb = if report.dry_run { "Would rename" } else { "Renamed" };
    for track in &report.renamed_tracks {
        let label = match track.source {
            RenameSource::Tags => format!("✅ {}:", verb).green().to_string(),
            RenameSource::Suggested => format!("🤖 AI {}:", verb).blue().to_string(),
        };
        writeln!(
            out,
            "{} {} → {}",
            label,
            file_name(&track.original),
            file_name(&track.new_path)
        )?;
    }
    for track in &report.skipped_tracks {
        writeln!(
            out,
            "{} {}",
            format!("⚠️ Skipped ({}):", track.reason).yellow(),
            file_name(&track.original)
        )?;
    }

    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "{}", format!("✅ {}: {}", verb, report.renamed_tracks.len()).green())?;
    writeln!(out, "{}", format!("⚠️ Skipped: {}", report.skipped_tracks.len()).yellow())?;
    if report.dry_run {
        writeln!(out, "Dry run: no files were changed.")?;
    }
    writeln!(out, "{}\n", RULE)?;
    print_log_paths(out, paths)
}
