//! Marker identifier → anchor phrase tables.
//!
//! Every identifier the generation prompt may emit is described here as data.
//! Adding a new target means adding a row, never touching the parser.

use crate::model::Anchor;
use unicode_normalization::UnicodeNormalization;

/// A whole-identifier target with its anchor phrases.
struct TargetEntry {
    keys: &'static [&'static str],
    phrases: &'static [&'static str],
}

/// An activity phase with its anchor phrases.
struct PartEntry {
    keys: &'static [&'static str],
    phrases: &'static [&'static str],
}

/// Targets identified by the full identifier.
const TARGETS: &[TargetEntry] = &[
    TargetEntry {
        keys: &["MỤC_TIÊU", "OBJECTIVES", "OBJECTIVE"],
        phrases: &[
            "3. Thái độ",
            "c) Thái độ",
            "c. Thái độ",
            "Thái độ",
            "Phẩm chất",
            "Năng lực chung",
            "Attitude",
            "Competencies",
            "II. THIẾT BỊ",
            "II. CHUẨN BỊ",
            "II. Equipment",
            "II. Preparation",
        ],
    },
    TargetEntry {
        keys: &["CỦNG_CỐ", "CONSOLIDATION"],
        phrases: &["Củng cố", "Vận dụng", "Consolidation", "Application"],
    },
];

/// Prefixes introducing an activity number.
const ACTIVITY_PREFIXES: &[&str] = &["HOẠT_ĐỘNG_", "HĐ_", "ACTIVITY_"];

/// Heading phrases for activity `{n}`.
const ACTIVITY_HEADINGS: &[&str] = &[
    "Hoạt động {n}:",
    "Hoạt động {n}.",
    "Hoạt động {n} ",
    "HĐ {n}:",
    "Activity {n}:",
    "Activity {n}.",
];

/// Activity phases.
const PARTS: &[PartEntry] = &[
    PartEntry {
        keys: &["NỘI_DUNG", "CONTENT"],
        phrases: &["b) Nội dung", "b. Nội dung", "Nội dung:", "Content:"],
    },
    PartEntry {
        keys: &["SẢN_PHẨM", "PRODUCT"],
        phrases: &["c) Sản phẩm", "c. Sản phẩm", "Sản phẩm:", "Product:"],
    },
    PartEntry {
        keys: &["TỔ_CHỨC", "ORGANIZATION"],
        phrases: &[
            "d) Tổ chức thực hiện",
            "d. Tổ chức thực hiện",
            "Tổ chức thực hiện",
            "Organization:",
        ],
    },
    PartEntry {
        keys: &["MỤC_TIÊU_HĐ", "GOAL"],
        phrases: &["a) Mục tiêu", "a. Mục tiêu", "Mục tiêu:", "Goal:"],
    },
    PartEntry {
        keys: &["BƯỚC_1", "STEP_1"],
        phrases: &["Bước 1:", "Bước 1.", "Chuyển giao nhiệm vụ", "Giao nhiệm vụ", "Step 1:"],
    },
    PartEntry {
        keys: &["BƯỚC_2", "STEP_2"],
        phrases: &["Bước 2:", "Bước 2.", "Thực hiện nhiệm vụ", "HS thực hiện", "Step 2:"],
    },
    PartEntry {
        keys: &["BƯỚC_3", "STEP_3"],
        phrases: &["Bước 3:", "Bước 3.", "Báo cáo", "Thảo luận", "Trình bày", "Step 3:"],
    },
    PartEntry {
        keys: &["BƯỚC_4", "STEP_4"],
        phrases: &["Bước 4:", "Bước 4.", "Kết luận", "Nhận định", "Đánh giá", "Step 4:"],
    },
    PartEntry {
        keys: &["KẾT_LUẬN", "CONCLUSION"],
        phrases: &["Kết luận, nhận định", "Kết luận", "Nhận định", "Conclusion"],
    },
];

/// Normalizes an identifier: NFC, upper case, `_` as the only separator.
pub fn normalize_identifier(identifier: &str) -> String {
    let upper: String = identifier.trim().nfc().collect::<String>().to_uppercase();
    let mut out = String::with_capacity(upper.len());
    for c in upper.chars() {
        let c = if c == ' ' || c == '-' { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Resolves a marker identifier into ordered anchors, most specific first.
///
/// Unknown identifiers resolve to an empty list.
pub fn resolve(identifier: &str) -> Vec<Anchor> {
    let key = normalize_identifier(identifier);

    if let Some(entry) = TARGETS.iter().find(|t| t.keys.contains(&key.as_str())) {
        return entry.phrases.iter().map(|p| Anchor::new(*p)).collect();
    }

    if let Some((number, rest)) = split_activity(&key) {
        let headings = activity_headings(number);
        // The last representable activity has no successor to bound its scope.
        let next_headings = number
            .checked_add(1)
            .map(activity_headings)
            .unwrap_or_default();

        let mut anchors = Vec::new();
        if let Some(part) = rest.and_then(find_part) {
            for phrase in part.phrases {
                for heading in &headings {
                    anchors.push(Anchor::scoped(*phrase, heading.clone(), next_headings.clone()));
                }
            }
        }
        anchors.extend(headings.into_iter().map(Anchor::new));
        return anchors;
    }

    // Legacy identifiers name a phase without an activity number.
    if let Some(part) = find_part(&key) {
        return part.phrases.iter().map(|p| Anchor::new(*p)).collect();
    }

    Vec::new()
}

/// Splits `HOẠT_ĐỘNG_2_BƯỚC_3` into `(2, Some("BƯỚC_3"))`.
fn split_activity(key: &str) -> Option<(u32, Option<&str>)> {
    let rest = ACTIVITY_PREFIXES
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix))?;

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let number: u32 = rest[..digits_end].parse().ok()?;

    let part = rest[digits_end..].trim_start_matches('_');
    Some((number, (!part.is_empty()).then_some(part)))
}

fn find_part(key: &str) -> Option<&'static PartEntry> {
    PARTS.iter().find(|p| p.keys.contains(&key))
}

fn activity_headings(number: u32) -> Vec<String> {
    ACTIVITY_HEADINGS
        .iter()
        .map(|t| t.replace("{n}", &number.to_string()))
        .collect()
}
