//! Paragraph index over the main markup part.
//!
//! The markup is walked once with a namespace-aware reader. Every `w:p`
//! element is recorded with its byte span and concatenated `w:t` text, so
//! anchors can be located without touching the serialized markup again.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use unicode_normalization::UnicodeNormalization;

/// WordprocessingML main namespace.
pub const W_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Qualified name the body must carry; rendered fragments use the `w:` prefix.
const W_BODY: &[u8] = b"w:body";

/// A paragraph of the original markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSpan {
    /// Byte offset of the opening `<w:p`
    pub start: usize,
    /// Byte offset just past the closing `</w:p>`
    pub end: usize,
    /// Where content placed after this paragraph goes next
    pub insert_at: usize,
    /// Concatenated text, NFC-normalized and lower-cased
    pub key: String,
}

impl ParagraphSpan {
    /// Returns true if this paragraph's text contains the normalized phrase.
    pub fn contains(&self, normalized_phrase: &str) -> bool {
        !normalized_phrase.is_empty() && self.key.contains(normalized_phrase)
    }
}

/// Paragraphs of a document body plus its end-of-body insertion point.
#[derive(Debug, Clone)]
pub struct MarkupIndex {
    /// Paragraphs in the order they close, so an inner paragraph comes
    /// before the one enclosing it.
    pub paragraphs: Vec<ParagraphSpan>,
    /// Byte offset of the body-level `w:sectPr`, or of `</w:body>`
    pub body_end: usize,
}

impl MarkupIndex {
    /// Builds the index for a `word/document.xml` string.
    pub fn scan(markup: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(markup);

        let mut paragraphs = Vec::new();
        // (start offset, accumulated text) of each open paragraph
        let mut open: Vec<(usize, String)> = Vec::new();
        let mut depth = 0usize;
        let mut body_depth: Option<usize> = None;
        let mut sect_pr: Option<usize> = None;
        let mut body_close: Option<usize> = None;
        let mut in_text = false;

        loop {
            let before = reader.buffer_position() as usize;
            let (ns, event) = reader.read_resolved_event()?;
            let is_w = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == W_NS);

            match event {
                Event::Start(ref e) => {
                    depth += 1;
                    if is_w {
                        match e.local_name().as_ref() {
                            b"p" => open.push((before, String::new())),
                            b"t" => in_text = true,
                            b"body" => {
                                if e.name().as_ref() != W_BODY {
                                    return Err(Error::UnsupportedMarkup(format!(
                                        "body element is <{}>, expected <w:body>",
                                        String::from_utf8_lossy(e.name().as_ref())
                                    )));
                                }
                                body_depth = Some(depth);
                            }
                            b"sectPr" if body_depth.is_some_and(|d| depth == d + 1) => {
                                sect_pr = Some(before);
                            }
                            _ => {}
                        }
                    }
                }
                Event::Empty(ref e) => {
                    if is_w {
                        match e.local_name().as_ref() {
                            b"p" => {
                                let after = reader.buffer_position() as usize;
                                paragraphs.push(ParagraphSpan {
                                    start: before,
                                    end: after,
                                    insert_at: after,
                                    key: String::new(),
                                });
                            }
                            b"sectPr" if body_depth.is_some_and(|d| depth == d) => {
                                sect_pr = Some(before);
                            }
                            _ => {}
                        }
                    }
                }
                Event::Text(ref t) if in_text => {
                    let text = t.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    for (_, buffer) in open.iter_mut() {
                        buffer.push_str(&text);
                    }
                }
                Event::CData(ref t) if in_text => {
                    let text = std::str::from_utf8(t)?;
                    for (_, buffer) in open.iter_mut() {
                        buffer.push_str(text);
                    }
                }
                Event::End(ref e) => {
                    if is_w {
                        match e.local_name().as_ref() {
                            b"p" => {
                                if let Some((start, text)) = open.pop() {
                                    let after = reader.buffer_position() as usize;
                                    paragraphs.push(ParagraphSpan {
                                        start,
                                        end: after,
                                        insert_at: after,
                                        key: normalize(&text),
                                    });
                                }
                            }
                            b"t" => in_text = false,
                            b"body" => body_close = Some(before),
                            _ => {}
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(Error::XmlParse(format!("{} unclosed w:p elements", open.len())));
        }

        let body_close = body_close.ok_or_else(|| Error::MissingComponent("w:body".into()))?;
        Ok(Self {
            paragraphs,
            body_end: sect_pr.unwrap_or(body_close),
        })
    }

    /// Returns the index of the first paragraph containing `phrase`.
    pub fn find(&self, phrase: &str) -> Option<usize> {
        let phrase = normalize(phrase);
        self.paragraphs.iter().position(|p| p.contains(&phrase))
    }

    /// Shifts recorded offsets after `len` bytes were inserted at `at`.
    pub fn record_insertion(&mut self, at: usize, len: usize) {
        for para in &mut self.paragraphs {
            if para.start >= at {
                para.start += len;
            }
            if para.end > at {
                para.end += len;
            }
            if para.insert_at >= at {
                para.insert_at += len;
            }
        }
        if self.body_end >= at {
            self.body_end += len;
        }
    }
}

/// Normalizes text for anchor comparison: NFC, lower case.
pub fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}
