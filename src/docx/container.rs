//! ZIP container wrapper for DOCX packages.

use crate::error::{Error, Result};
use bytes::Bytes;
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::{CompressionMethod, DateTime, ZipArchive};

/// Well-known package paths.
pub mod paths {
    pub const CONTENT_TYPES: &str = "[Content_Types].xml";
    pub const PACKAGE_RELS: &str = "_rels/.rels";
    pub const DOCUMENT_XML: &str = "word/document.xml";
    pub const STYLES_XML: &str = "word/styles.xml";
    pub const NUMBERING_XML: &str = "word/numbering.xml";
    pub const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";
}

/// Relationship type of the main document part.
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Local file header signature; every ZIP package starts with it.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// One entry of a package, kept exactly as it was read.
#[derive(Debug, Clone)]
pub struct Part {
    /// Path inside the archive
    pub path: String,
    /// Uncompressed content
    pub data: Bytes,
    /// Compression method of the original entry
    pub compression: CompressionMethod,
    /// Modification time of the original entry
    pub modified: Option<DateTime>,
    /// True for directory entries
    pub is_dir: bool,
}

/// An unpacked DOCX package.
///
/// Parts are kept in archive order. Only the main markup part is ever decoded
/// as text; every other part is carried through as opaque bytes.
#[derive(Debug, Clone)]
pub struct OriginalPackage {
    parts: Vec<Part>,
    main_index: usize,
}

impl OriginalPackage {
    /// Opens a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Opens a package from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Opens a package from bytes.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        let data: Bytes = data.into();
        if !data.starts_with(ZIP_MAGIC) {
            return Err(Error::NotAPackage("missing ZIP signature".into()));
        }

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut parts = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;

            parts.push(Part {
                path: entry.name().to_string(),
                data: Bytes::from(content),
                compression: entry.compression(),
                modified: entry.last_modified(),
                is_dir: entry.is_dir(),
            });
        }

        let main_path = find_main_part(&parts);
        let main_index = parts
            .iter()
            .position(|p| p.path == main_path)
            .ok_or_else(|| Error::MissingComponent(main_path.clone()))?;

        debug!("Opened package with {} parts, main part {}", parts.len(), main_path);
        Ok(Self { parts, main_index })
    }

    /// Returns the path of the main markup part.
    pub fn main_path(&self) -> &str {
        &self.parts[self.main_index].path
    }

    /// Decodes the main markup part as UTF-8.
    pub fn main_markup(&self) -> Result<&str> {
        let data = &self.parts[self.main_index].data;
        Ok(std::str::from_utf8(data)?)
    }

    /// Returns every part in archive order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns every part except the main markup part.
    pub fn aux_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.main_index)
            .map(|(_, p)| p)
    }

    /// Gets a part by path.
    pub fn get(&self, path: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.path == path)
    }

    /// Returns the number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the package holds no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Locates the main document part through `_rels/.rels`, falling back to
/// the conventional path.
fn find_main_part(parts: &[Part]) -> String {
    parts
        .iter()
        .find(|p| p.path == paths::PACKAGE_RELS)
        .and_then(|rels| std::str::from_utf8(&rels.data).ok())
        .and_then(office_document_target)
        .unwrap_or_else(|| paths::DOCUMENT_XML.to_string())
}

/// Extracts the target of the officeDocument relationship.
fn office_document_target(rels_xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(rels_xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                let mut rel_type = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().ok()?.into_owned();
                    match attr.key.as_ref() {
                        b"Type" => rel_type = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if rel_type.as_deref() == Some(OFFICE_DOCUMENT_REL) {
                    return target.map(|t| t.trim_start_matches('/').to_string());
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}
