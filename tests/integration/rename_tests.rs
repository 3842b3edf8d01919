use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::tempdir;
use tunetidy::rename::{RenameConfig, RenameSource, Renamer, SkipReason};
use tunetidy::suggest::{NameSuggester, NoSuggester};
use tunetidy::tags::{TagReader, TrackTags};

/// Tags keyed by file name.
#[derive(Default)]
struct FakeTags(HashMap<String, TrackTags>);

impl FakeTags {
    fn with(mut self, file: &str, artist: Option<&str>, title: Option<&str>) -> Self {
        self.0.insert(file.to_string(), TrackTags::new(artist, title));
        self
    }
}

impl TagReader for FakeTags {
    fn read_tags(&self, path: &Path) -> TrackTags {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.0.get(&name).cloned().unwrap_or_default()
    }
}

/// Answers from a fixed table and records what was asked.
#[derive(Default)]
struct FakeSuggester {
    answers: HashMap<String, String>,
    asked: Mutex<Vec<String>>,
}

impl NameSuggester for FakeSuggester {
    fn suggest(&self, filename: &str, _artist: Option<&str>, _title: Option<&str>) -> Option<String> {
        self.asked.lock().unwrap().push(filename.to_string());
        self.answers.get(filename).cloned()
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, name.as_bytes()).unwrap();
    path
}

fn renamer(tags: FakeTags, suggester: Arc<dyn NameSuggester>, dry_run: bool) -> Renamer {
    Renamer::new(
        RenameConfig::default()
            .with_dry_run(dry_run)
            .with_timestamp("2024-01-01_00-00-00"),
        Arc::new(tags),
        suggester,
    )
}

#[test]
fn test_rename_from_tags() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "01 track.mp3");

    let tags = FakeTags::default().with("01 track.mp3", Some("Daft Punk"), Some("One More Time"));
    let report = renamer(tags, Arc::new(NoSuggester), false)
        .rename_all(dir.path())
        .unwrap();

    assert_eq!(report.renamed_tracks.len(), 1);
    let track = &report.renamed_tracks[0];
    assert_eq!(track.source, RenameSource::Tags);
    assert_eq!(track.new_path, dir.path().join("Daft Punk - One More Time.mp3"));
    assert!(track.new_path.exists());
    assert!(!dir.path().join("01 track.mp3").exists());
}

#[test]
fn test_unsafe_and_shouting_tags_are_cleaned() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "x.mp3");

    let tags = FakeTags::default().with("x.mp3", Some("AC/DC"), Some("BACK IN BLACK"));
    let report = renamer(tags, Arc::new(NoSuggester), false)
        .rename_all(dir.path())
        .unwrap();

    assert_eq!(
        report.renamed_tracks[0].new_path,
        dir.path().join("Ac-Dc - Back In Black.mp3")
    );
    // The log keeps the raw tag values.
    assert_eq!(report.renamed_tracks[0].artist, "AC/DC");
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = tempdir().unwrap();
    let original = touch(dir.path(), "a.mp3");

    let tags = FakeTags::default().with("a.mp3", Some("Artist"), Some("Song"));
    let report = renamer(tags, Arc::new(NoSuggester), true)
        .rename_all(dir.path())
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.renamed_tracks.len(), 1);
    assert!(original.exists());
    assert!(!dir.path().join("Artist - Song.mp3").exists());
}

#[test]
fn test_already_formatted_is_skipped() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "artist - song.mp3");

    let tags = FakeTags::default().with("artist - song.mp3", Some("Artist"), Some("Song"));
    let report = renamer(tags, Arc::new(NoSuggester), false)
        .rename_all(dir.path())
        .unwrap();

    assert!(report.renamed_tracks.is_empty());
    assert_eq!(report.skipped_tracks[0].reason, SkipReason::AlreadyFormatted);
}

#[test]
fn test_existing_target_is_not_overwritten() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.mp3");
    let existing = touch(dir.path(), "Artist - Song.mp3");

    let tags = FakeTags::default()
        .with("a.mp3", Some("Artist"), Some("Song"))
        .with("Artist - Song.mp3", Some("Artist"), Some("Song"));
    let report = renamer(tags, Arc::new(NoSuggester), false)
        .rename_all(dir.path())
        .unwrap();

    assert!(report.renamed_tracks.is_empty());
    assert!(report
        .skipped_tracks
        .iter()
        .any(|s| s.original == dir.path().join("a.mp3") && s.reason == SkipReason::TargetExists));
    assert_eq!(fs::read(&existing).unwrap(), b"Artist - Song.mp3");
}

#[test]
fn test_missing_tags_use_suggestion() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "track01.mp3");

    let suggester = Arc::new(FakeSuggester {
        answers: HashMap::from([(
            "track01.mp3".to_string(),
            "Queen - Bohemian Rhapsody".to_string(),
        )]),
        ..FakeSuggester::default()
    });
    let report = renamer(FakeTags::default(), suggester.clone(), false)
        .rename_all(dir.path())
        .unwrap();

    assert_eq!(report.suggested_count(), 1);
    let track = &report.renamed_tracks[0];
    assert_eq!(track.source, RenameSource::Suggested);
    assert_eq!(track.artist, "Queen");
    assert_eq!(track.title, "Bohemian Rhapsody");
    assert!(dir.path().join("Queen - Bohemian Rhapsody.mp3").exists());
    assert_eq!(suggester.asked.lock().unwrap().as_slice(), ["track01.mp3"]);
}

#[test]
fn test_suggestion_collision_gets_number() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.mp3");
    touch(dir.path(), "Band - Tune.mp3");

    let tags = FakeTags::default().with("Band - Tune.mp3", Some("Band"), Some("Tune"));
    let suggester = Arc::new(FakeSuggester {
        answers: HashMap::from([("a.mp3".to_string(), "Band - Tune".to_string())]),
        ..FakeSuggester::default()
    });
    let report = renamer(tags, suggester, false).rename_all(dir.path()).unwrap();

    assert_eq!(
        report.renamed_tracks[0].new_path,
        dir.path().join("Band - Tune (1).mp3")
    );
    assert!(dir.path().join("Band - Tune.mp3").exists());
}

#[test]
fn test_no_suggestion_is_skipped() {
    let dir = tempdir().unwrap();
    let path = touch(dir.path(), "mystery.wav");

    let report = renamer(FakeTags::default(), Arc::new(NoSuggester), false)
        .rename_all(dir.path())
        .unwrap();

    assert_eq!(report.skipped_tracks.len(), 1);
    assert_eq!(report.skipped_tracks[0].reason, SkipReason::NoSuggestion);
    assert_eq!(
        report.skipped_tracks[0].reason.to_string(),
        "missing tags + AI failed"
    );
    assert!(path.exists());
}

#[test]
fn test_other_extensions_are_ignored() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "cover.jpg");

    let report = renamer(FakeTags::default(), Arc::new(NoSuggester), false)
        .rename_all(dir.path())
        .unwrap();

    assert!(report.renamed_tracks.is_empty());
    assert!(report.skipped_tracks.is_empty());
    assert!(dir.path().join("cover.jpg").exists());
}

#[test]
fn test_custom_pattern() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.mp3");

    let tags = FakeTags::default().with("a.mp3", Some("Artist"), Some("Song"));
    let report = Renamer::new(
        RenameConfig::default().with_pattern("{title} ({artist})"),
        Arc::new(tags),
        Arc::new(NoSuggester),
    )
    .rename_all(dir.path())
    .unwrap();

    assert_eq!(report.renamed_tracks[0].new_path, dir.path().join("Song (Artist).mp3"));
}

#[test]
fn test_missing_folder_is_an_error() {
    let dir = tempdir().unwrap();
    let result = renamer(FakeTags::default(), Arc::new(NoSuggester), false)
        .rename_all(&dir.path().join("nope"));
    assert!(result.is_err());
}

#[test]
fn test_quarantine_folder_is_left_alone() {
    let dir = tempdir().unwrap();
    let session = dir.path().join("trash").join("2024-01-01_00-00-00");
    fs::create_dir_all(&session).unwrap();
    let quarantined = touch(&session, "01 untitled.mp3");
    touch(dir.path(), "02 untitled.mp3");

    let suggester = Arc::new(FakeSuggester::default());
    let renamer = Renamer::new(
        RenameConfig::default()
            .with_timestamp("2024-01-01_00-00-00")
            .with_trash_dir(dir.path().join("trash")),
        Arc::new(FakeTags::default()),
        suggester.clone(),
    );
    let report = renamer.rename_all(dir.path()).unwrap();

    assert_eq!(report.skipped_tracks.len(), 1);
    assert_eq!(report.skipped_tracks[0].original, dir.path().join("02 untitled.mp3"));
    assert_eq!(*suggester.asked.lock().unwrap(), vec!["02 untitled.mp3".to_string()]);
    assert!(quarantined.exists());
}
