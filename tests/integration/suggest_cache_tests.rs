use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::tempdir;
use tunetidy::suggest::{
    CachedSuggester, NameSuggester, SuggestError, SuggestionBackend, SuggestionCache,
};

struct ScriptedBackend {
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn replying(reply: Option<&'static str>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SuggestionBackend for ScriptedBackend {
    fn request(&self, _: &str, _: Option<&str>, _: Option<&str>) -> Result<String, SuggestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .map(str::to_string)
            .ok_or_else(|| SuggestError::Network("connection refused".to_string()))
    }
}

#[test]
fn test_cache_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache/ai_cache.json");

    let first = CachedSuggester::new(
        ScriptedBackend::replying(Some("Moby - Porcelain")),
        SuggestionCache::load(&path),
    );
    assert_eq!(
        first.suggest("porcelain.mp3", None, None).as_deref(),
        Some("Moby - Porcelain")
    );
    assert!(path.exists());

    let second = CachedSuggester::new(ScriptedBackend::replying(None), SuggestionCache::load(&path));
    assert_eq!(
        second.suggest("Porcelain.MP3", None, None).as_deref(),
        Some("Moby - Porcelain")
    );
    assert_eq!(second.cache().len(), 1);
}

#[test]
fn test_failures_are_not_cached() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ai_cache.json");

    let backend = ScriptedBackend::replying(None);
    let suggester = CachedSuggester::new(backend, SuggestionCache::load(&path));

    assert!(suggester.suggest("a.mp3", None, None).is_none());
    assert!(suggester.suggest("a.mp3", None, None).is_none());
    assert!(suggester.cache().is_empty());
    assert!(!path.exists());
}

#[test]
fn test_corrupt_cache_starts_empty_and_recovers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ai_cache.json");
    fs::write(&path, "{ not json").unwrap();

    let cache = SuggestionCache::load(&path);
    assert!(cache.is_empty());

    cache.put("b.mp3", "Artist - B");
    let reloaded = SuggestionCache::load(&path);
    assert_eq!(reloaded.get("b.mp3").as_deref(), Some("Artist - B"));
}

#[test]
fn test_cache_file_is_plain_json_map() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ai_cache.json");

    let cache = SuggestionCache::load(&path);
    cache.put("Song.mp3", "Band - Song");

    let text = fs::read_to_string(&path).unwrap();
    let map: std::collections::BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
    assert_eq!(map.get("song.mp3").map(String::as_str), Some("Band - Song"));
    assert!(!dir.path().join("ai_cache.json.tmp").exists());
}
