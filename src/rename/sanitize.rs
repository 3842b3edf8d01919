//! File name cleanup for tag-derived and suggested names.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Characters that are not allowed in file names on common filesystems.
static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("literal pattern"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("literal pattern"));

/// Make a single name component safe and tidy.
///
/// - forbidden characters become `-`
/// - whitespace runs collapse to one space, ends trimmed
/// - ALL CAPS text becomes Title Case
/// - trailing dots and spaces are removed
///
/// # Examples
///
/// ```
/// use tunetidy::rename::sanitize_component;
///
/// assert_eq!(sanitize_component("AC/DC"), "Ac-Dc");
/// assert_eq!(sanitize_component("  Daft   Punk. "), "Daft Punk");
/// ```
#[must_use]
pub fn sanitize_component(text: &str) -> String {
    let replaced = INVALID_CHARS.replace_all(text, "-");
    let collapsed = WHITESPACE.replace_all(&replaced, " ");
    let mut cleaned = collapsed.trim().to_string();

    if is_all_caps(&cleaned) {
        cleaned = title_case(&cleaned);
    }

    cleaned.trim_end_matches([' ', '.']).to_string()
}

/// At least one cased letter, and no lowercase letters.
fn is_all_caps(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Uppercase letters that follow a non-letter, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Substitute `{artist}` and `{title}` into a naming pattern.
#[must_use]
pub fn format_pattern(pattern: &str, artist: &str, title: &str) -> String {
    pattern
        .replace("{artist}", artist)
        .replace("{title}", title)
        .trim()
        .to_string()
}

/// Whether the file's stem already reads `Artist - Title` (case-insensitive).
#[must_use]
pub fn already_correct_name(path: &Path, artist: &str, title: &str) -> bool {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let expected = format!("{} - {}", artist, title).trim().to_lowercase();
    stem.trim() == expected
}
