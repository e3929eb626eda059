//! DOCX (WordprocessingML) packages.
//!
//! DOCX files are ZIP archives whose main part, `word/document.xml`, holds
//! the body markup. Merging touches that part only.
//!
//! Injected fragments are written with the conventional `w:` prefix. Word
//! and every common producer bind WordprocessingML to `w`; a main part that
//! binds it to another prefix, or to the default namespace, is rejected with
//! [`crate::Error::UnsupportedMarkup`] instead of receiving markup with an
//! unbound prefix.

mod container;
mod inject;
mod package;
mod parts;
mod scan;

pub use container::{paths, OriginalPackage, Part};
pub use inject::{inject, Injection};
pub use package::{write_fresh, write_merged};
pub use scan::{MarkupIndex, ParagraphSpan, W_NS};
