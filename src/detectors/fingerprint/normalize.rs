//! Lexical normalization of source text.
//!
//! Comments are removed with three sequential passes, in this order:
//! `#` line comments, `//` line comments, then `/* ... */` block comments
//! (which may span lines). The text is then lower-cased and every whitespace
//! run collapses to one space.
//!
//! The passes are purely lexical. A `#` or `//` inside a string literal or a
//! URL also starts a "comment" and truncates the line. Existing fingerprints
//! depend on this behavior, so it is kept as is.

use once_cell::sync::Lazy;
use regex::Regex;

static HASH_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#.*").expect("valid regex"));
static SLASH_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*").expect("valid regex"));
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// Whether `c` separates tokens: Unicode whitespace plus the ASCII
/// information separators U+001C..=U+001F.
pub fn is_token_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Split `text` into non-empty tokens on [`is_token_separator`].
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_token_separator).filter(|token| !token.is_empty())
}

/// Normalize source code into a canonical, comment-free token stream.
///
/// Total over all inputs; the empty string normalizes to the empty string.
pub fn normalize_code(source_code: &str) -> String {
    let without_hash = HASH_COMMENT.replace_all(source_code, "");
    let without_slash = SLASH_COMMENT.replace_all(&without_hash, "");
    let without_block = BLOCK_COMMENT.replace_all(&without_slash, "");

    let lowered = without_block.to_lowercase();
    tokens(&lowered).collect::<Vec<_>>().join(" ")
}
