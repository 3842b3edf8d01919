use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tempfile::{tempdir, TempDir};
use tunetidy::duplicates::{DuplicateFinder, FinderConfig, FinderError, MoveOutcome};
use tunetidy::scanner::{FileEntry, HashError, Hasher, ScanError, WalkerConfig};

struct Library {
    _dir: TempDir,
    music: PathBuf,
    trash: PathBuf,
}

fn library() -> Library {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    let trash = dir.path().join("trash");
    fs::create_dir(&music).unwrap();
    Library {
        _dir: dir,
        music,
        trash,
    }
}

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn finder(trash: &Path) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_trash_dir(trash.to_path_buf())
            .with_timestamp("2024-01-01_00-00-00"),
    )
}

/// Contents of every file under `dir`, one element per file, sorted.
fn contents_under(dir: &Path) -> Vec<Vec<u8>> {
    let mut contents: Vec<Vec<u8>> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| fs::read(e.path()).unwrap())
        .collect();
    contents.sort();
    contents
}

#[test]
fn test_scan_empty_directory() {
    let lib = library();
    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    assert!(report.duplicates_removed.is_empty());
    assert_eq!(report.files_scanned, 0);
    assert!(report.is_clean());
    // The session directory exists even when nothing is moved.
    assert!(report.quarantine_dir.is_dir());
}

#[test]
fn test_scan_unique_files() {
    let lib = library();
    write(&lib.music.join("a.mp3"), b"content a");
    write(&lib.music.join("b.mp3"), b"content b");
    write(&lib.music.join("c.mp3"), b"content c");

    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    assert!(report.duplicates_removed.is_empty());
    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.distinct_hashes, 3);
    assert!(lib.music.join("a.mp3").exists());
}

#[test]
fn test_copy_marker_loses() {
    let lib = library();
    write(&lib.music.join("song.mp3"), b"same audio");
    write(&lib.music.join("song (1).mp3"), b"same audio");

    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    assert_eq!(report.duplicates_removed.len(), 1);
    let entry = &report.duplicates_removed[0];
    assert_eq!(entry.original, lib.music.join("song.mp3"));
    assert_eq!(entry.duplicate, lib.music.join("song (1).mp3"));
    assert_eq!(entry.outcome, MoveOutcome::Moved);

    let moved_to = entry.dupe_moved_to.clone().unwrap();
    assert_eq!(moved_to, report.quarantine_dir.join("song (1).mp3"));
    assert!(moved_to.exists());
    assert!(lib.music.join("song.mp3").exists());
    assert!(!lib.music.join("song (1).mp3").exists());
}

#[test]
fn test_lexicographic_fallback_across_directories() {
    let lib = library();
    write(&lib.music.join("b/track.mp3"), b"same");
    write(&lib.music.join("a/track.mp3"), b"same");

    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    assert_eq!(report.duplicates_removed.len(), 1);
    assert_eq!(report.duplicates_removed[0].original, lib.music.join("a/track.mp3"));
    assert!(lib.music.join("a/track.mp3").exists());
    assert!(!lib.music.join("b/track.mp3").exists());
}

#[test]
fn test_three_copies_keep_one() {
    let lib = library();
    write(&lib.music.join("x.mp3"), b"triple");
    write(&lib.music.join("x - Copy.mp3"), b"triple");
    write(&lib.music.join("sub/x.mp3"), b"triple");
    write(&lib.music.join("other.mp3"), b"other");

    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    assert_eq!(report.files_scanned, 4);
    assert_eq!(report.distinct_hashes, 2);
    assert_eq!(
        report.duplicates_removed.len(),
        report.files_scanned - report.distinct_hashes
    );
    let originals: BTreeSet<_> = report
        .duplicates_removed
        .iter()
        .map(|e| e.original.clone())
        .collect();
    assert_eq!(originals.len(), 1);
    assert!(lib.music.join("sub/x.mp3").exists());
    assert_eq!(fs::read_dir(&report.quarantine_dir).unwrap().count(), 2);
}

#[test]
fn test_same_name_collisions_in_quarantine() {
    let lib = library();
    write(&lib.music.join("a/song.mp3"), b"dup");
    write(&lib.music.join("b/song.mp3"), b"dup");
    write(&lib.music.join("c/song.mp3"), b"dup");

    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    let destinations: BTreeSet<_> = report
        .duplicates_removed
        .iter()
        .filter_map(|e| e.dupe_moved_to.clone())
        .collect();
    assert_eq!(destinations.len(), 2);
    assert!(destinations.contains(&report.quarantine_dir.join("song.mp3")));
    assert!(destinations.contains(&report.quarantine_dir.join("song (1).mp3")));
}

#[test]
fn test_extension_filter_is_case_insensitive() {
    let lib = library();
    write(&lib.music.join("loud.MP3"), b"same");
    write(&lib.music.join("loud.mp3"), b"same");
    write(&lib.music.join("loud.flac"), b"same");

    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.duplicates_removed.len(), 1);
    assert!(lib.music.join("loud.flac").exists());
}

#[test]
fn test_no_content_is_lost() {
    let lib = library();
    write(&lib.music.join("one.mp3"), b"1");
    write(&lib.music.join("one (1).mp3"), b"1");
    write(&lib.music.join("deep/er/one.mp3"), b"1");
    write(&lib.music.join("two.mp3"), b"2");
    write(&lib.music.join("two copy.mp3"), b"2");

    let before = contents_under(&lib.music);
    let report = finder(&lib.trash).scan(&lib.music).unwrap();

    let mut after = contents_under(&lib.music);
    assert_eq!(after.len(), 2);
    after.extend(contents_under(&lib.trash));
    after.sort();
    assert_eq!(before, after);

    assert_eq!(report.duplicates_removed.len(), 3);
    assert_eq!(report.bytes_quarantined, 3);
    for entry in &report.duplicates_removed {
        assert_eq!(entry.outcome, MoveOutcome::Moved);
        assert!(!entry.duplicate.exists());
        let moved_to = entry.dupe_moved_to.as_ref().unwrap();
        assert_eq!(Hasher::hash_bytes(&fs::read(moved_to).unwrap()), entry.hash);
    }
}

#[test]
fn test_repeated_path_keeps_the_file() {
    let lib = library();
    let track = lib.music.join("only.mp3");
    write(&track, b"single copy");

    let files = vec![FileEntry::new(track.clone(), 11), FileEntry::new(track.clone(), 11)];
    let report = finder(&lib.trash).scan_files(&lib.music, files).unwrap();

    assert!(report.duplicates_removed.is_empty());
    assert_eq!(report.distinct_hashes, 1);
    assert_eq!(fs::read(&track).unwrap(), b"single copy");
}

#[cfg(unix)]
#[test]
fn test_followed_symlink_alias_is_not_a_duplicate() {
    let lib = library();
    let real = lib.music.join("real");
    write(&real.join("x.mp3"), b"the only copy");
    std::os::unix::fs::symlink(&real, lib.music.join("alias")).unwrap();

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_trash_dir(lib.trash.clone())
            .with_timestamp("2024-01-01_00-00-00")
            .with_walker_config(WalkerConfig {
                follow_symlinks: true,
                ..WalkerConfig::with_extensions(["mp3"])
            }),
    );
    let report = finder.scan(&lib.music).unwrap();

    assert!(report.duplicates_removed.is_empty());
    assert_eq!(report.files_scanned, 1);
    assert_eq!(fs::read(real.join("x.mp3")).unwrap(), b"the only copy");
    assert!(contents_under(&lib.trash).is_empty());
}

#[test]
fn test_quarantine_inside_root_is_not_rescanned() {
    let lib = library();
    let trash = lib.music.join("trash");
    write(&lib.music.join("a.mp3"), b"same");
    write(&lib.music.join("b.mp3"), b"same");

    let first = finder(&trash).scan(&lib.music).unwrap();
    assert_eq!(first.duplicates_removed.len(), 1);

    let second = DuplicateFinder::new(
        FinderConfig::default()
            .with_trash_dir(trash.clone())
            .with_timestamp("2024-01-01_00-00-01"),
    )
    .scan(&lib.music)
    .unwrap();

    assert_eq!(second.files_scanned, 1);
    assert!(second.duplicates_removed.is_empty());
    assert!(first.duplicates_removed[0].dupe_moved_to.as_ref().unwrap().exists());
}

#[test]
fn test_session_name_collision_gets_suffix() {
    let lib = library();
    let first = finder(&lib.trash).scan(&lib.music).unwrap();
    let second = finder(&lib.trash).scan(&lib.music).unwrap();

    assert_eq!(first.timestamp, "2024-01-01_00-00-00");
    assert_eq!(second.timestamp, "2024-01-01_00-00-00_1");
    assert_ne!(first.quarantine_dir, second.quarantine_dir);
}

#[test]
fn test_unreadable_files_are_reported() {
    let lib = library();
    write(&lib.music.join("a.mp3"), b"same");
    write(&lib.music.join("b.mp3"), b"same");

    let files = vec![
        FileEntry::new(lib.music.join("a.mp3"), 4),
        FileEntry::new(lib.music.join("gone.mp3"), 4),
        FileEntry::new(lib.music.join("b.mp3"), 4),
    ];
    let report = finder(&lib.trash).scan_files(&lib.music, files).unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.scan_errors.len(), 1);
    assert!(matches!(
        report.scan_errors[0],
        ScanError::HashError(HashError::NotFound(_))
    ));
    assert_eq!(report.scan_errors[0].path(), lib.music.join("gone.mp3"));
    assert_eq!(report.duplicates_removed.len(), 1);
    assert!(!report.is_clean());
}

#[test]
fn test_missing_root_is_an_error() {
    let lib = library();
    let result = finder(&lib.trash).scan(&lib.music.join("nope"));
    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_file_root_is_an_error() {
    let lib = library();
    let file = lib.music.join("a.mp3");
    write(&file, b"x");
    let result = finder(&lib.trash).scan(&file);
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_interrupted_before_start() {
    let lib = library();
    write(&lib.music.join("a.mp3"), b"same");
    write(&lib.music.join("b.mp3"), b"same");

    let flag = Arc::new(AtomicBool::new(true));
    let report = DuplicateFinder::new(
        FinderConfig::default()
            .with_trash_dir(lib.trash.clone())
            .with_shutdown_flag(flag),
    )
    .scan(&lib.music)
    .unwrap();

    assert!(report.interrupted);
    assert!(report.duplicates_removed.is_empty());
    assert!(lib.music.join("b.mp3").exists());
}

#[test]
fn test_ignore_patterns_and_hidden() {
    let lib = library();
    write(&lib.music.join("a.mp3"), b"same");
    write(&lib.music.join("live/a.mp3"), b"same");
    write(&lib.music.join(".hidden/a.mp3"), b"same");

    let walker = WalkerConfig {
        ignore_patterns: vec!["live/".to_string()],
        skip_hidden: true,
        ..WalkerConfig::with_extensions(["mp3"])
    };
    let report = DuplicateFinder::new(
        FinderConfig::default()
            .with_walker_config(walker)
            .with_trash_dir(lib.trash.clone()),
    )
    .scan(&lib.music)
    .unwrap();

    assert_eq!(report.files_scanned, 1);
    assert!(report.duplicates_removed.is_empty());
}

#[test]
fn test_single_thread_matches_parallel() {
    let lib = library();
    for i in 0..20 {
        write(&lib.music.join(format!("t{:02}.mp3", i)), format!("{}", i % 5).as_bytes());
    }

    let report = DuplicateFinder::new(
        FinderConfig::default()
            .with_trash_dir(lib.trash.clone())
            .with_io_threads(1)
            .with_chunk_size(1),
    )
    .scan(&lib.music)
    .unwrap();

    assert_eq!(report.files_scanned, 20);
    assert_eq!(report.distinct_hashes, 5);
    assert_eq!(report.duplicates_removed.len(), 15);
    for i in 0..5 {
        assert!(lib.music.join(format!("t{:02}.mp3", i)).exists());
    }
}
