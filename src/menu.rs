//! Interactive text menu, shown when no subcommand is given.
//!
//! One action per run: the user picks an option, enters a folder and the
//! matching command runs once.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use yansi::Paint;

use crate::commands::{self, App};
use crate::error::ExitCode;

const OPTIONS: &str = "\
🎶 Music Toolkit - Choose an option:
1. Inspect Tags
2. Detect Duplicates
3. Rename Tracks
4. Transcribe Audio
5. Exit";

/// Menu choice parsed from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Inspect,
    Duplicates,
    Rename,
    Transcribe,
    Exit,
}

impl Choice {
    /// Anything unrecognised exits.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => Self::Inspect,
            "2" => Self::Duplicates,
            "3" => Self::Rename,
            "4" => Self::Transcribe,
            _ => Self::Exit,
        }
    }
}

/// Strip whitespace and surrounding quotes from a pasted folder path.
#[must_use]
pub fn clean_folder_input(input: &str) -> String {
    input
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn prompt<R: BufRead, W: Write + ?Sized>(input: &mut R, out: &mut W, text: &str) -> Result<String> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read input")?;
    Ok(line)
}

fn ask_folder<R: BufRead, W: Write + ?Sized>(input: &mut R, out: &mut W) -> Result<PathBuf> {
    let raw = prompt(input, out, "Enter the folder path: ")?;
    let folder = clean_folder_input(&raw);
    if folder.is_empty() {
        bail!("No folder given");
    }
    Ok(PathBuf::from(folder))
}

/// Show the menu, read one choice and run it.
///
/// # Errors
///
/// Fails on I/O errors, an empty folder, or when the chosen command fails.
pub fn run<R: BufRead, W: Write>(app: &App, input: &mut R, out: &mut W) -> Result<ExitCode> {
    writeln!(out, "\n{}", OPTIONS)?;
    let choice = Choice::parse(&prompt(input, out, "Enter choice: ")?);
    log::debug!("Menu choice: {:?}", choice);

    match choice {
        Choice::Inspect => {
            let folder = ask_folder(input, out)?;
            commands::inspect(app, &folder, out)
        }
        Choice::Duplicates => {
            let folder = ask_folder(input, out)?;
            commands::detect_duplicates(app, &folder, out)
        }
        Choice::Rename => {
            let folder = ask_folder(input, out)?;
            let answer = prompt(input, out, "Would you like to run a test (dry run)? (y/n): ")?;
            let dry_run = answer.trim().eq_ignore_ascii_case("y");
            let suggester = commands::build_suggester(&app.config, false);
            commands::rename_tracks(app, &folder, dry_run, suggester, out)
        }
        Choice::Transcribe => {
            writeln!(out, "{}", "Transcription is not available in this build.".yellow())?;
            Ok(ExitCode::Success)
        }
        Choice::Exit => {
            writeln!(out, "Goodbye!")?;
            Ok(ExitCode::Success)
        }
    }
}
