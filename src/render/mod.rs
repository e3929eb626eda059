//! Rendering of generated text into document blocks and WordprocessingML.

mod blocks;
mod options;
mod wordml;

pub use blocks::render_blocks;
pub use options::{Highlight, RenderOptions, DEFAULT_FALLBACK_TITLE, DEFAULT_HIGHLIGHT_COLOR};
pub use wordml::{escape_xml, Target, WordRenderer, BULLET_NUM_ID};

use crate::model::Document;

/// Renders text into a fresh document model.
pub fn render_document(text: &str, options: &RenderOptions) -> Document {
    Document::from_blocks(render_blocks(text, options))
}

/// Renders text into markup ready to splice into an existing document body.
pub fn render_fragment(text: &str, options: &RenderOptions) -> String {
    let blocks = render_blocks(text, options);
    WordRenderer::injected(options).render_blocks(&blocks)
}

/// Renders a fresh document model into a complete `word/document.xml`.
pub fn render_document_xml(document: &Document, options: &RenderOptions) -> String {
    WordRenderer::fresh(options).render_document(document)
}
