use proptest::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tunetidy::duplicates::{choose_keeper, SeenIndex};
use tunetidy::rename::sanitize_component;
use tunetidy::scanner::Hasher;

fn file_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}( \\(1\\)| - copy)?\\.mp3"
}

proptest! {
    #[test]
    fn test_hash_matches_in_memory_digest(
        content in prop::collection::vec(any::<u8>(), 0..20_000),
        chunk in 1usize..5000,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.mp3");
        fs::write(&path, &content).unwrap();

        let streamed = Hasher::new().with_chunk_size(chunk).hash_file(&path).unwrap();
        prop_assert_eq!(streamed, Hasher::hash_bytes(&content));
    }

    #[test]
    fn test_keeper_is_symmetric(a in file_name(), b in file_name(), da in "[a-c]", db in "[a-c]") {
        let pa = PathBuf::from(format!("/m/{}/{}", da, a));
        let pb = PathBuf::from(format!("/m/{}/{}", db, b));
        prop_assume!(pa != pb);

        let (k1, l1) = choose_keeper(&pa, &pb);
        let (k2, l2) = choose_keeper(&pb, &pa);
        prop_assert_eq!(k1, k2);
        prop_assert_eq!(l1, l2);
        prop_assert_ne!(k1, l1);
    }

    #[test]
    fn test_seen_index_keeper_independent_of_order(
        names in prop::collection::btree_set(file_name(), 1..8),
    ) {
        let paths: Vec<PathBuf> = names.iter().map(|n| PathBuf::from(format!("/m/{}", n))).collect();
        let hash = Hasher::hash_bytes(b"same");

        let mut forward = SeenIndex::new();
        for p in &paths {
            forward.resolve(hash, p.clone());
        }
        let mut backward = SeenIndex::new();
        for p in paths.iter().rev() {
            backward.resolve(hash, p.clone());
        }

        prop_assert_eq!(forward.keeper(&hash), backward.keeper(&hash));
        prop_assert_eq!(forward.len(), 1);
    }

    #[test]
    fn test_sanitized_names_are_safe(text in "\\PC{0,40}") {
        let clean = sanitize_component(&text);
        prop_assert!(!clean.contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*']));
        prop_assert!(!clean.ends_with('.'));
        prop_assert!(!clean.ends_with(' '));
        prop_assert!(!clean.contains("  "));
    }
}
