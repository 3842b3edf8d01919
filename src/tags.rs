//! Artist/title tag reading backed by `lofty`.
//!
//! Tag access goes through the [`TagReader`] trait so the rename engine can
//! be driven by fixed tags in tests. [`LoftyTagReader`] is the real reader.

use std::path::{Path, PathBuf};

use lofty::config::{ParseOptions, ParsingMode};
use lofty::file::{TaggedFile, TaggedFileExt};
use lofty::prelude::Accessor;
use lofty::probe::Probe;
use lofty::tag::Tag;

use crate::scanner::{ScanError, Walker, WalkerConfig};

/// Artist and title of one track, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub artist: Option<String>,
    pub title: Option<String>,
}

impl TrackTags {
    /// Build from raw values, normalizing each.
    #[must_use]
    pub fn new(artist: Option<&str>, title: Option<&str>) -> Self {
        Self {
            artist: artist.and_then(normalize_tag_value),
            title: title.and_then(normalize_tag_value),
        }
    }

    /// Both artist and title are known.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.artist.is_some() && self.title.is_some()
    }
}

/// Normalize a raw tag value: trimmed, `None` when empty.
#[must_use]
pub fn normalize_tag_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Source of artist/title tags.
pub trait TagReader: Send + Sync {
    /// Read tags for `path`. Unreadable or untagged files yield empty tags.
    fn read_tags(&self, path: &Path) -> TrackTags;
}

/// [`TagReader`] using `lofty` (ID3v2, RIFF INFO, Vorbis comments, MP4).
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl LoftyTagReader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Option<TaggedFile> {
        let options = ParseOptions::new()
            .read_properties(false)
            .read_cover_art(false)
            .parsing_mode(ParsingMode::BestAttempt);

        let probe = match Probe::open(path) {
            Ok(probe) => probe,
            Err(e) => {
                log::debug!("Cannot open {} for tags: {}", path.display(), e);
                return None;
            }
        };
        match probe.options(options).read() {
            Ok(tagged_file) => Some(tagged_file),
            Err(e) => {
                log::debug!("Tag parse failed for {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn first_non_empty<F>(primary: Option<&Tag>, tags: &[Tag], mut extract: F) -> Option<String>
where
    F: FnMut(&Tag) -> Option<String>,
{
    primary
        .into_iter()
        .chain(tags)
        .filter_map(|tag| extract(tag))
        .find_map(|value| normalize_tag_value(&value))
}

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> TrackTags {
        let Some(tagged_file) = Self::open(path) else {
            return TrackTags::default();
        };
        let primary = tagged_file.primary_tag();
        let tags = tagged_file.tags();

        TrackTags {
            artist: first_non_empty(primary, tags, |tag| tag.artist().map(|v| v.into_owned())),
            title: first_non_empty(primary, tags, |tag| tag.title().map(|v| v.into_owned())),
        }
    }
}

/// One row of a tag inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInspection {
    pub path: PathBuf,
    pub tags: TrackTags,
}

impl TagInspection {
    /// Artist for display, `<no artist>` when absent.
    #[must_use]
    pub fn artist_display(&self) -> &str {
        self.tags.artist.as_deref().unwrap_or("<no artist>")
    }

    /// Title for display, `<no title>` when absent.
    #[must_use]
    pub fn title_display(&self) -> &str {
        self.tags.title.as_deref().unwrap_or("<no title>")
    }
}

/// List every matching file under `folder` with its tags, in walk order.
///
/// # Errors
///
/// Returns `ScanError` when `folder` is missing or not a directory.
pub fn inspect_tags(
    folder: &Path,
    reader: &dyn TagReader,
    extensions: &[String],
) -> Result<Vec<TagInspection>, ScanError> {
    if !folder.exists() {
        return Err(ScanError::NotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(ScanError::NotADirectory(folder.to_path_buf()));
    }

    let walker = Walker::new(folder, WalkerConfig::with_extensions(extensions));
    let rows = walker
        .walk()
        .filter_map(|entry| match entry {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("Skipping {}", e);
                None
            }
        })
        .map(|file| TagInspection {
            tags: reader.read_tags(&file.path),
            path: file.path,
        })
        .collect();
    Ok(rows)
}
