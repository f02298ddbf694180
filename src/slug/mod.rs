//! URL slugs for catalog entries.
//!
//! A slug is the normalized game name plus a short random suffix. Uniqueness is
//! enforced by the `games.slug` index; this module never queries the store.

use deunicode::deunicode;
use rand::Rng;

/// Maximum length of the normalized base, before the suffix is appended.
pub const MAX_BASE_LEN: usize = 50;

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 4;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Normalize a display name into a URL-safe token.
///
/// Transliterates to ASCII (accented Latin letters lose their marks, other
/// scripts are romanized), lower-cases, drops any other punctuation and joins
/// the remaining words with a single `-`.
pub fn make_slug(name: &str) -> String {
    let ascii = deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || matches!(ch, '-' | '_' | '.' | '/' | '+' | '&') {
            pending_separator = true;
        }
    }

    if slug.len() > MAX_BASE_LEN {
        slug.truncate(MAX_BASE_LEN);
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Build `<base>-<suffix>` for a display name.
pub fn generate_unique_slug(name: &str) -> String {
    let base = make_slug(name);
    format!("{}-{}", base, random_suffix())
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}
