use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tempfile::tempdir;
use tunetidy::duplicates::{DuplicateFinder, FinderConfig};
use tunetidy::output::{save_duplicate_log, save_rename_log};
use tunetidy::rename::{RenameReport, RenameSource, RenamedTrack, SkipReason, SkippedTrack};

#[test]
fn test_duplicate_logs_after_scan() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    fs::create_dir(&music).unwrap();
    fs::write(music.join("hit.mp3"), b"same bytes").unwrap();
    fs::write(music.join("hit (2).mp3"), b"same bytes").unwrap();

    let report = DuplicateFinder::new(
        FinderConfig::default()
            .with_trash_dir(dir.path().join("trash"))
            .with_timestamp("2025-01-02_03-04-05"),
    )
    .scan(&music)
    .unwrap();

    let logs = dir.path().join("logs");
    let paths = save_duplicate_log(&report, &logs).unwrap();

    assert_eq!(paths.json, logs.join("duplicates_2025-01-02_03-04-05.json"));
    assert_eq!(paths.txt, logs.join("duplicates_2025-01-02_03-04-05.txt"));

    let json: Value = serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
    assert_eq!(json["timestamp"], "2025-01-02_03-04-05");
    assert_eq!(json["files_scanned"], 2);
    let entry = &json["duplicates_removed"][0];
    assert!(entry["original"].as_str().unwrap().ends_with("hit.mp3"));
    assert!(entry["duplicate"].as_str().unwrap().ends_with("hit (2).mp3"));
    assert_eq!(entry["hash"].as_str().unwrap().len(), 64);
    assert_eq!(entry["outcome"]["status"], "moved");

    let text = fs::read_to_string(&paths.txt).unwrap();
    assert!(text.starts_with("Duplicate Report\n"));
    assert!(text.contains("Found    : 1 duplicate(s)"));
    assert!(text.contains("MOVED TO :"));
}

#[test]
fn test_rename_logs() {
    let dir = tempdir().unwrap();
    let mut report = RenameReport::new(PathBuf::from("/m"), "2025-01-02_03-04-05".into(), true);
    report.renamed_tracks.push(RenamedTrack {
        original: PathBuf::from("/m/x.mp3"),
        new_path: PathBuf::from("/m/A - B.mp3"),
        artist: "A".into(),
        title: "B".into(),
        source: RenameSource::Tags,
    });
    report.skipped_tracks.push(SkippedTrack {
        original: PathBuf::from("/m/y.mp3"),
        reason: SkipReason::NoSuggestion,
    });

    let paths = save_rename_log(&report, dir.path()).unwrap();
    assert!(paths.json.ends_with("renamed_2025-01-02_03-04-05.json"));

    let json: Value = serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["renamed_tracks"][0]["source"], "tags");
    assert_eq!(json["skipped_tracks"][0]["reason"], "missing tags + AI failed");

    let text = fs::read_to_string(&paths.txt).unwrap();
    assert!(text.contains("Mode     : dry run"));
    assert!(text.contains("    → /m/A - B.mp3"));
    assert!(text.contains("(Reason: missing tags + AI failed)"));
}

#[test]
fn test_log_dir_is_created() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a/b/c");
    let report = RenameReport::new(PathBuf::from("/m"), "ts".into(), false);

    let paths = save_rename_log(&report, &nested).unwrap();
    assert!(paths.json.exists());
    assert!(paths.txt.exists());
}
