//! Marked-text parsing.
//!
//! Generated output carries labeled sections of the form
//!
//! ```text
//! ===NLS_HOẠT_ĐỘNG_2_BƯỚC_3===
//! <red>- HS dùng GeoGebra vẽ đồ thị</red>
//! ===END===
//! ```
//!
//! The parser extracts them in order of appearance and resolves each
//! identifier to its anchor phrases through [`anchors::resolve`].

pub mod anchors;

use crate::model::ContentSection;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Close marker ending every section.
pub const CLOSE_MARKER: &str = "===END===";

/// Phrase the model writes when objectives are quoted from the PPCT.
pub const DISTRIBUTION_NOTE: &str = "(Nội dung trích xuất nguyên văn từ PPCT)";

/// Open marker with its identifier.
static OPEN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"===NLS_([^=\n]+)===").unwrap());

/// Any open or close marker.
pub(crate) static ANY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"===NLS_([^=\n]+)===|===END===").unwrap());

/// Extracts every well-formed section from raw generated text.
///
/// An open marker followed by another open marker before any close marker is
/// unbalanced and yields nothing; parsing resumes at the second marker. Zero
/// sections is not an error.
pub fn parse_sections(raw: &str) -> Vec<ContentSection> {
    let mut sections = Vec::new();
    let mut open: Option<(String, usize)> = None;

    for caps in ANY_MARKER.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };

        match caps.get(1) {
            Some(identifier) => {
                if let Some((marker, _)) = open.take() {
                    debug!("Dropping unterminated section {}", marker);
                }
                open = Some((identifier.as_str().trim().to_string(), whole.end()));
            }
            None => {
                if let Some((marker, body_start)) = open.take() {
                    let body = raw[body_start..whole.start()].trim().to_string();
                    let anchors = anchors::resolve(&marker);
                    sections.push(ContentSection {
                        marker,
                        body,
                        anchors,
                    });
                }
            }
        }
    }

    if let Some((marker, _)) = open {
        debug!("Dropping unterminated section {}", marker);
    }
    debug!("Found {} marked sections", sections.len());

    sections
}

/// Rewrites markers into readable headings for an on-screen preview.
pub fn preview_markdown(raw: &str) -> String {
    let with_headings = OPEN_MARKER.replace_all(raw, |caps: &regex::Captures| {
        format!("\n**📌 {}:**\n", preview_title(&caps[1]))
    });
    with_headings.replace(CLOSE_MARKER, "\n---\n")
}

/// Returns true if the output says its objectives come verbatim from the PPCT.
pub fn cites_distribution(raw: &str) -> bool {
    raw.contains(DISTRIBUTION_NOTE)
}

/// Replaces markers with `[IDENTIFIER]` label lines, for whole-text fallback.
pub fn strip_markers(raw: &str) -> String {
    let labeled = OPEN_MARKER.replace_all(raw, |caps: &regex::Captures| {
        format!("\n[{}]\n", caps[1].trim())
    });
    labeled.replace(CLOSE_MARKER, "\n")
}

fn preview_title(identifier: &str) -> String {
    let key = anchors::normalize_identifier(identifier);
    match key.as_str() {
        "MỤC_TIÊU" => "MỤC TIÊU NĂNG LỰC SỐ".to_string(),
        "CỦNG_CỐ" => "CỦNG CỐ - TÍCH HỢP NLS".to_string(),
        _ => match key.strip_prefix("HOẠT_ĐỘNG_") {
            Some(rest) => format!("HOẠT ĐỘNG {} - TÍCH HỢP NLS", rest.replace('_', " ")),
            None => key.replace('_', " "),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequential_sections() {
        let raw = "Lời mở đầu\n\
            ===NLS_MỤC_TIÊU===\n<red>4. Năng lực số:</red>\n===END===\n\
            giữa\n\
            ===NLS_HOẠT_ĐỘNG_1_BƯỚC_2===\n<red>- HS dùng MTCT</red>\n===END===";

        let sections = parse_sections(raw);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].marker, "MỤC_TIÊU");
        assert_eq!(sections[0].body, "<red>4. Năng lực số:</red>");
        assert_eq!(sections[1].marker, "HOẠT_ĐỘNG_1_BƯỚC_2");
        assert_eq!(sections[1].body, "<red>- HS dùng MTCT</red>");
        assert!(sections.iter().all(|s| s.is_placeable()));
    }

    #[test]
    fn test_parse_single_line_section() {
        let sections = parse_sections("===NLS_OBJECTIVES=== <red>- Goal X</red> ===END===");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "<red>- Goal X</red>");
    }

    #[test]
    fn test_parse_no_sections() {
        assert!(parse_sections("").is_empty());
        assert!(parse_sections("## Giáo án\n- không có marker").is_empty());
        assert!(parse_sections("===END===").is_empty());
    }

    #[test]
    fn test_unbalanced_open_is_skipped() {
        let raw = "===NLS_MỤC_TIÊU===\nmất\n===NLS_CỦNG_CỐ===\ngiữ\n===END===\n===NLS_HOẠT_ĐỘNG_1===\ncụt";
        let sections = parse_sections(raw);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].marker, "CỦNG_CỐ");
        assert_eq!(sections[0].body, "giữ");
    }

    #[test]
    fn test_unknown_marker_emitted_without_anchors() {
        let sections = parse_sections("===NLS_PHỤ_LỤC===\nnội dung\n===END===");
        assert_eq!(sections.len(), 1);
        assert!(sections[0].anchors.is_empty());
    }

    #[test]
    fn test_n_pairs_yield_n_sections() {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        for _ in 0..20 {
            let n = rng.gen_range(0..12);
            let mut raw = String::new();
            for i in 0..n {
                raw.push_str(&format!("filler {i}\n===NLS_HOẠT_ĐỘNG_{i}===\nbody {i}\n===END===\n"));
            }
            let sections = parse_sections(&raw);
            assert_eq!(sections.len(), n);
            for (i, section) in sections.iter().enumerate() {
                assert_eq!(section.body, format!("body {i}"));
            }
        }
    }

    #[test]
    fn test_preview_markdown() {
        let raw = "===NLS_MỤC_TIÊU===\nx\n===END===\n===NLS_HOẠT_ĐỘNG_2===\ny\n===END===";
        let preview = preview_markdown(raw);
        assert!(preview.contains("**📌 MỤC TIÊU NĂNG LỰC SỐ:**"));
        assert!(preview.contains("**📌 HOẠT ĐỘNG 2 - TÍCH HỢP NLS:**"));
        assert!(preview.contains("\n---\n"));
        assert!(!preview.contains("==="));
    }

    #[test]
    fn test_strip_markers() {
        let stripped = strip_markers("===NLS_PHỤ_LỤC=== a ===END===");
        assert!(stripped.contains("[PHỤ_LỤC]"));
        assert!(stripped.contains(" a "));
        assert!(!stripped.contains("==="));
    }

    #[test]
    fn test_cites_distribution() {
        assert!(cites_distribution("Mục tiêu (Nội dung trích xuất nguyên văn từ PPCT)"));
        assert!(!cites_distribution("Mục tiêu"));
    }
}
