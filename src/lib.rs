//! tunetidy - music library housekeeping
//!
//! Inspects artist/title tags, quarantines byte-identical duplicate tracks
//! (BLAKE3 content hashing) and renames tracks to `Artist - Title`, asking an
//! optional name-suggestion service for files without usable tags.

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod menu;
pub mod output;
pub mod progress;
pub mod rename;
pub mod scanner;
pub mod signal;
pub mod suggest;
pub mod tags;

use std::io::{self, Write};

use anyhow::Context;

use cli::{Cli, Commands, DupesArgs, RenameArgs, TagsArgs};
use commands::App;
use config::Config;
use error::ExitCode;

/// Fold `dupes` flags into the loaded configuration.
pub fn apply_dupes_overrides(config: &mut Config, args: &DupesArgs) {
    if let Some(dir) = &args.trash_dir {
        config.trash_dir = dir.clone();
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = dir.clone();
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    if let Some(threads) = args.io_threads {
        config.io_threads = usize::from(threads);
    }
    if let Some(size) = args.chunk_size {
        config.chunk_size = usize::try_from(size).unwrap_or(usize::MAX).max(1);
    }
    config.ignore_patterns.extend(args.ignore_patterns.iter().cloned());
    config.follow_symlinks |= args.follow_symlinks;
    config.skip_hidden |= args.skip_hidden;
}

/// Fold `rename` flags into the loaded configuration.
pub fn apply_rename_overrides(config: &mut Config, args: &RenameArgs) {
    if let Some(pattern) = &args.pattern {
        config.rename_pattern = pattern.clone();
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = dir.clone();
    }
    if !args.extensions.is_empty() {
        config.rename_extensions = args.extensions.clone();
    }
}

fn apply_tags_overrides(config: &mut Config, args: &TagsArgs) {
    if !args.extensions.is_empty() {
        config.rename_extensions = args.extensions.clone();
    }
}

/// Run the parsed command line and return the exit code.
///
/// # Errors
///
/// Returns an error for invalid configuration, a bad folder, or any
/// failure that prevents the command from producing its report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective configuration: {:?}", config.redacted());

    let shutdown = signal::install_handler().context("Failed to set up Ctrl+C handling")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Tags(args) => {
            apply_tags_overrides(&mut config, &args);
            let app = App::new(config, cli.quiet, shutdown);
            commands::inspect(&app, &args.path, &mut out)?
        }
        Commands::Dupes(args) => {
            apply_dupes_overrides(&mut config, &args);
            let app = App::new(config, cli.quiet, shutdown);
            commands::detect_duplicates(&app, &args.path, &mut out)?
        }
        Commands::Rename(args) => {
            apply_rename_overrides(&mut config, &args);
            let suggester = commands::build_suggester(&config, args.no_ai);
            let app = App::new(config, cli.quiet, shutdown);
            commands::rename_tracks(&app, &args.path, args.dry_run, suggester, &mut out)?
        }
        Commands::Menu => {
            let app = App::new(config, cli.quiet, shutdown);
            let stdin = io::stdin();
            menu::run(&app, &mut stdin.lock(), &mut out)?
        }
        Commands::Config => {
            write!(out, "{}", config.redacted().to_toml()?)?;
            ExitCode::Success
        }
    };

    out.flush()?;
    Ok(code)
}
