//! Anchor-based injection into an existing document body.
//!
//! Sections are processed in order. Each one is inserted right after the
//! first paragraph matching its first matching anchor; anchors are tried
//! most specific first. Content inserted by this merge is never searched,
//! so a later section cannot anchor on an earlier section's text.

use super::scan::{normalize, MarkupIndex, ParagraphSpan};
use crate::error::Result;
use crate::marked;
use crate::model::{Anchor, AnchorScope, ContentSection};
use crate::options::MergeOptions;
use crate::render::{render_fragment, WordRenderer};
use crate::report::{FallbackKind, MergeReport, Placement};
use log::{debug, info, warn};

/// Mutated markup together with the merge summary.
#[derive(Debug, Clone)]
pub struct Injection {
    /// The new main markup part
    pub markup: String,
    /// What was placed where
    pub report: MergeReport,
}

/// Injects `sections` into `markup`.
///
/// `raw` is the full generated text; it is appended whole when no section
/// could be placed.
pub fn inject(
    markup: &str,
    sections: &[ContentSection],
    raw: &str,
    options: &MergeOptions,
) -> Result<Injection> {
    let mut index = MarkupIndex::scan(markup)?;
    let mut output = markup.to_string();
    let mut report = MergeReport {
        total: sections.len(),
        ..Default::default()
    };
    let mut unplaced: Vec<&ContentSection> = Vec::new();

    for section in sections {
        let Some((para, anchor)) = locate(&index, &section.anchors, options.scoped_anchors) else {
            warn!("No anchor found for section {}", section.marker);
            unplaced.push(section);
            continue;
        };

        let fragment = render_fragment(&section.body, &options.render);
        let at = index.paragraphs[para].insert_at;
        output.insert_str(at, &fragment);
        index.record_insertion(at, fragment.len());

        debug!("Placed section {} after \"{}\"", section.marker, anchor);
        report.placed += 1;
        report.placements.push(Placement {
            marker: section.marker.clone(),
            anchor: anchor.to_string(),
        });
    }
    report.unplaced = unplaced.iter().map(|s| s.marker.clone()).collect();

    let renderer = WordRenderer::injected(&options.render);
    let fallback = if report.placed == 0 {
        if raw.trim().is_empty() {
            None
        } else {
            warn!("No section could be placed; appending the whole text");
            report.fallback = FallbackKind::WholeText;
            Some(render_fragment(&marked::strip_markers(raw), &options.render))
        }
    } else if !unplaced.is_empty() {
        warn!("Appending {} unplaced sections at the end", unplaced.len());
        report.fallback = FallbackKind::Sections;

        let mut block = String::new();
        for section in &unplaced {
            if options.label_unplaced {
                renderer.render_label(&format!("[{}]", section.marker), &mut block);
            }
            block.push_str(&render_fragment(&section.body, &options.render));
        }
        Some(block)
    } else {
        None
    };

    if let Some(content) = fallback {
        let mut block = String::new();
        if options.fallback_header {
            block.push_str(&renderer.fallback_header());
        }
        block.push_str(&content);

        let at = index.body_end;
        output.insert_str(at, &block);
        index.record_insertion(at, block.len());
    }

    info!("Merge finished: {}", report);
    Ok(Injection {
        markup: output,
        report,
    })
}

/// Finds the paragraph for the first anchor that matches.
fn locate<'s>(
    index: &MarkupIndex,
    anchors: &'s [Anchor],
    scoped: bool,
) -> Option<(usize, &'s Anchor)> {
    anchors.iter().find_map(|anchor| {
        let found = match &anchor.scope {
            None => index.find(&anchor.phrase),
            Some(scope) if scoped => find_scoped(index, &anchor.phrase, scope),
            Some(_) => None,
        };
        found.map(|para| (para, anchor))
    })
}

/// Finds `phrase` between the paragraph opening the scope and the next
/// paragraph closing it.
fn find_scoped(index: &MarkupIndex, phrase: &str, scope: &AnchorScope) -> Option<usize> {
    let opener = index.find(&scope.after)?;
    let region_start = index.paragraphs[opener].end;

    let closers: Vec<String> = scope.until.iter().map(|p| normalize(p)).collect();
    let region_end = index
        .paragraphs
        .iter()
        .filter(|p| p.start >= region_start)
        .filter(|p| closers.iter().any(|c| p.contains(c)))
        .map(|p| p.start)
        .min()
        .unwrap_or(usize::MAX);

    let phrase = normalize(phrase);
    let within = |p: &ParagraphSpan| p.start >= region_start && p.end <= region_end;
    index
        .paragraphs
        .iter()
        .position(|p| within(p) && p.contains(&phrase))
}
