//! Inline formatting.
//!
//! Converts the small inline dialect used by generated text into runs:
//!
//! | Syntax            | Emphasis  |
//! |-------------------|-----------|
//! | `**text**`        | bold      |
//! | `*text*`, `_text_`| italic    |
//! | `<u>text</u>`     | underline |
//! | `<red>text</red>` | highlight |
//!
//! Markers do not nest: the outermost marker decides the emphasis and any
//! markers inside it are removed from the text. A `<red>` or `<u>` tag left
//! unmatched on a line (the model often spans a tag over several lines)
//! applies to the remainder of that line.
//!
//! Both renderers consume [`tokenize`], so a line produces the same runs
//! whether it ends up in a fresh document or is injected into an existing one.

use crate::model::{TextRun, TextStyle};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static RE_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*\*(?P<bold>.+?)\*\*|\*(?P<star>[^*\s][^*]*?)\*|\b_(?P<under>[^_\n]+?)_\b|(?i:<u>)(?P<u>.+?)(?i:</u>)|(?i:<red>)(?P<red>.+?)(?i:</red>)",
    )
    .unwrap()
});

static RE_STRAY_RED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?red>").unwrap());

static RE_STRAY_U: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?u>").unwrap());

/// Splits a line into formatted runs.
///
/// A line without markers yields exactly one unstyled run equal to the input.
pub fn tokenize(line: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in RE_INLINE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };

        push_plain(&line[last..whole.start()], &mut runs);

        let (content, style) = if let Some(m) = caps.name("bold") {
            (m.as_str(), TextStyle::bold())
        } else if let Some(m) = caps.name("star").or_else(|| caps.name("under")) {
            (m.as_str(), TextStyle::italic())
        } else if let Some(m) = caps.name("u") {
            (m.as_str(), TextStyle::underline())
        } else if let Some(m) = caps.name("red") {
            (m.as_str(), TextStyle::highlight())
        } else {
            continue;
        };

        let text = strip_markers(content);
        if !text.is_empty() {
            runs.push(TextRun::with_style(text, style));
        }
        last = whole.end();
    }

    push_plain(&line[last..], &mut runs);

    if runs.is_empty() {
        runs.push(TextRun::new(strip_markers(line)));
    }
    runs
}

/// Returns the text of a line with every inline marker removed.
pub fn strip_markers(line: &str) -> String {
    let stripped = RE_INLINE.replace_all(line, |caps: &regex::Captures| {
        ["bold", "star", "under", "u", "red"]
            .iter()
            .find_map(|name| caps.name(name))
            .map(|m| strip_markers(m.as_str()))
            .unwrap_or_default()
    });
    let stripped = RE_STRAY_RED.replace_all(&stripped, "");
    RE_STRAY_U.replace_all(&stripped, "").into_owned()
}

/// Pushes text found outside any marker, honoring stray tags.
fn push_plain(segment: &str, runs: &mut Vec<TextRun>) {
    if segment.is_empty() {
        return;
    }

    let mut style = TextStyle::default();
    let mut text = Cow::Borrowed(segment);

    if RE_STRAY_RED.is_match(&text) {
        style.highlight = true;
        text = Cow::Owned(RE_STRAY_RED.replace_all(&text, "").into_owned());
    }
    if RE_STRAY_U.is_match(&text) {
        style.underline = true;
        text = Cow::Owned(RE_STRAY_U.replace_all(&text, "").into_owned());
    }

    if !text.is_empty() {
        runs.push(TextRun::with_style(text.into_owned(), style));
    }
}
