//! # Line Cleanup
//!
//! Generated text carries artifacts that must never reach the final
//! document: labels the prompt forbids, competency codes, editorial
//! placeholders and leaked section markers. Each line passes through this
//! stage before block classification.
//!
//! 1. **Normalization** - Unicode NFC
//! 2. **Label rewrite** - `* Tích hợp NLS:` becomes a `- ` bullet
//! 3. **Code removal** - `(1.1NC1a)`, `(5.2.NC1a)` and similar
//! 4. **Line filter** - placeholders and delimiter lines are dropped, markers
//!    sharing a line with content are removed from it

use crate::marked::ANY_MARKER;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Cleanup configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Apply Unicode NFC normalization
    pub normalize_unicode: bool,
    /// Rewrite the `Tích hợp NLS:` label into a bullet
    pub rewrite_integration_label: bool,
    /// Remove parenthesized competency codes
    pub strip_competency_codes: bool,
    /// Drop editorial placeholder and delimiter lines
    pub drop_placeholders: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            rewrite_integration_label: true,
            strip_competency_codes: true,
            drop_placeholders: true,
        }
    }
}

impl CleanupOptions {
    /// Creates options that leave text untouched except for delimiter lines.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: false,
            rewrite_integration_label: false,
            strip_competency_codes: false,
            drop_placeholders: true,
        }
    }
}

/// Line prefixes meant for a human editor, never for the document.
const PLACEHOLDER_PREFIXES: &[&str] = &["[chèn", "(chèn", "[tiếp tục", "(tiếp tục", "..."];

/// Prefix of leaked section markers.
const DELIMITER_PREFIX: &str = "===";

// Regex patterns (compiled once using LazyLock)
static RE_INTEGRATION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\*?\s*tích hợp nls:\s*").unwrap());

static RE_COMPETENCY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\.\d+\.?[A-Za-z]+\d*[a-z]?\)").unwrap());

/// Returns true if a trimmed line is a structural delimiter or placeholder.
///
/// A delimiter line holds nothing but section markers and `=` runs; a line
/// that carries content next to a marker is kept (see [`clean_line`]).
pub fn is_droppable_line(trimmed: &str) -> bool {
    if trimmed.starts_with(DELIMITER_PREFIX) && is_delimiter_only(trimmed) {
        return true;
    }
    let lower = trimmed.to_lowercase();
    PLACEHOLDER_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn is_delimiter_only(trimmed: &str) -> bool {
    ANY_MARKER
        .replace_all(trimmed, "")
        .chars()
        .all(|c| c == '=' || c.is_whitespace())
}

/// Removes inline section markers, e.g. from a whole section on one line.
pub fn strip_markers(line: &str) -> Cow<'_, str> {
    if ANY_MARKER.is_match(line) {
        Cow::Owned(ANY_MARKER.replace_all(line, "").trim().to_string())
    } else {
        Cow::Borrowed(line)
    }
}

/// Cleans a single trimmed line.
///
/// Returns `None` when the line must not be rendered at all.
pub fn clean_line<'a>(trimmed: &'a str, options: &CleanupOptions) -> Option<Cow<'a, str>> {
    if options.drop_placeholders && is_droppable_line(trimmed) {
        return None;
    }

    let mut line: Cow<'a, str> = if options.drop_placeholders {
        strip_markers(trimmed)
    } else {
        Cow::Borrowed(trimmed)
    };

    if options.normalize_unicode {
        line = Cow::Owned(line.nfc().collect());
    }

    if options.rewrite_integration_label && RE_INTEGRATION_LABEL.is_match(&line) {
        line = Cow::Owned(RE_INTEGRATION_LABEL.replace(&line, "- ").into_owned());
    }

    if options.strip_competency_codes && RE_COMPETENCY_CODE.is_match(&line) {
        line = Cow::Owned(RE_COMPETENCY_CODE.replace_all(&line, "").into_owned());
    }

    Some(line)
}
