//! Filename inference for tracks with missing tags.
//!
//! The rename engine only sees the [`NameSuggester`] trait. The production
//! implementation is a [`CachedSuggester`] wrapping the [`OpenAiBackend`];
//! every answer the backend gives is cleaned by [`clean_suggestion`] and
//! stored in a [`SuggestionCache`] so a file is only ever asked about once.

pub mod cache;
pub mod openai;

use std::path::PathBuf;

pub use cache::{cache_key, SuggestionCache};
pub use openai::{OpenAiBackend, OpenAiConfig};

use crate::rename::sanitize_component;

/// Infers an `Artist - Title` name for a file.
pub trait NameSuggester: Send + Sync {
    /// Suggest a name (without extension), or `None` when nothing usable came back.
    fn suggest(
        &self,
        filename: &str,
        artist_hint: Option<&str>,
        title_hint: Option<&str>,
    ) -> Option<String>;
}

/// A remote model that answers one raw suggestion request.
pub trait SuggestionBackend: Send + Sync {
    /// Ask for a raw suggestion.
    ///
    /// # Errors
    ///
    /// Returns `SuggestError` on network, auth, rate-limit or parse failures.
    fn request(
        &self,
        filename: &str,
        artist_hint: Option<&str>,
        title_hint: Option<&str>,
    ) -> Result<String, SuggestError>;
}

/// Errors from the suggestion backend or cache.
#[derive(thiserror::Error, Debug)]
pub enum SuggestError {
    /// No API key was configured.
    #[error("No API key configured (set suggester.api_key or OPENAI_API_KEY)")]
    MissingApiKey,

    /// The service rejected the credentials.
    #[error("Authentication failed (HTTP {0})")]
    Auth(u16),

    /// The service asked us to slow down.
    #[error("Rate limited by suggestion service")]
    RateLimited,

    /// Any other non-success HTTP status.
    #[error("Suggestion service returned HTTP {0}")]
    Http(u16),

    /// Connection, DNS, TLS or timeout failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not what we expected.
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// The cache file could not be written.
    #[error("Cannot write suggestion cache {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache serialization error.
    #[error("Cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".flac", ".m4a", ".ogg", ".aac"];

/// Turn a raw model answer into a usable name.
///
/// Takes the first non-empty line, strips wrapping quotes or backticks and
/// a trailing audio extension, then sanitizes the result.
#[must_use]
pub fn clean_suggestion(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let mut name = line.trim_matches(|c: char| matches!(c, '"' | '\'' | '`')).trim();

    for ext in AUDIO_EXTENSIONS {
        let Some(cut) = name.len().checked_sub(ext.len()) else {
            continue;
        };
        if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(ext) {
            name = &name[..cut];
            break;
        }
    }

    let cleaned = sanitize_component(name);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Suggester that never suggests anything (used with `--no-ai`).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSuggester;

impl NameSuggester for NoSuggester {
    fn suggest(&self, _: &str, _: Option<&str>, _: Option<&str>) -> Option<String> {
        None
    }
}

/// Cache-first suggester over a backend.
pub struct CachedSuggester<B: SuggestionBackend> {
    backend: B,
    cache: SuggestionCache,
}

impl<B: SuggestionBackend> CachedSuggester<B> {
    #[must_use]
    pub fn new(backend: B, cache: SuggestionCache) -> Self {
        Self { backend, cache }
    }

    /// The underlying cache.
    #[must_use]
    pub fn cache(&self) -> &SuggestionCache {
        &self.cache
    }
}

impl<B: SuggestionBackend> NameSuggester for CachedSuggester<B> {
    fn suggest(
        &self,
        filename: &str,
        artist_hint: Option<&str>,
        title_hint: Option<&str>,
    ) -> Option<String> {
        if let Some(hit) = self.cache.get(filename) {
            log::debug!("Suggestion cache hit for {}", filename);
            return Some(hit);
        }

        let raw = match self.backend.request(filename, artist_hint, title_hint) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("No suggestion for {}: {}", filename, e);
                return None;
            }
        };

        let suggestion = clean_suggestion(&raw)?;
        self.cache.put(filename, &suggestion);
        Some(suggestion)
    }
}
