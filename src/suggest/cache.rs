//! On-disk cache of name suggestions.
//!
//! The cache is a flat JSON object mapping a normalized filename to the
//! suggested `Artist - Title`. It is rewritten after every new entry so an
//! interrupted run keeps what it already paid for.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use unicode_normalization::UnicodeNormalization;

use super::SuggestError;

/// Normalize a filename into a cache key (NFC, trimmed, lowercased).
#[must_use]
pub fn cache_key(filename: &str) -> String {
    filename.trim().nfc().collect::<String>().to_lowercase()
}

/// Persistent map of filename to suggestion.
#[derive(Debug, Default)]
pub struct SuggestionCache {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl SuggestionCache {
    /// Cache that never touches the disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache file at `path`.
    ///
    /// A missing, empty or corrupt file yields an empty cache; the file is
    /// recreated on the next successful `put`.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!(
                        "Suggestion cache {} is corrupt ({}), starting empty",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Cannot read suggestion cache {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        log::debug!("Loaded {} cached suggestions", entries.len());

        Self {
            path: Some(path.to_path_buf()),
            entries: Mutex::new(entries),
        }
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached suggestion for a filename.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<String> {
        self.entries().get(&cache_key(filename)).cloned()
    }

    /// Store a suggestion and persist the cache.
    ///
    /// Persistence failures are logged; the in-memory entry is kept.
    pub fn put(&self, filename: &str, suggestion: &str) {
        self.entries()
            .insert(cache_key(filename), suggestion.to_string());
        if let Err(e) = self.flush() {
            log::warn!("{}", e);
        }
    }

    /// Write the cache to disk (temp file, then rename over the old one).
    ///
    /// # Errors
    ///
    /// Returns `SuggestError::Cache` if the file cannot be written.
    pub fn flush(&self) -> Result<(), SuggestError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let cache_err = |source| SuggestError::Cache {
            path: path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(&*self.entries())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(cache_err)?;
        }
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(cache_err)?;
        fs::rename(&tmp, path).map_err(cache_err)?;
        Ok(())
    }

    /// Number of cached suggestions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
