//! Package assembly.
//!
//! Merge mode rewrites only the main markup part and copies every other part
//! with its original path, order, compression method and timestamp. Fresh
//! mode writes a minimal package around a generated `word/document.xml`.

use super::container::{paths, OriginalPackage, Part};
use super::parts;
use crate::error::Result;
use log::debug;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Repacks `original` with its main markup part replaced by `main_markup`.
pub fn write_merged(original: &OriginalPackage, main_markup: &str) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let main_path = original.main_path();

    for part in original.parts() {
        let options = entry_options(part);

        if part.is_dir {
            writer.add_directory(part.path.as_str(), options)?;
            continue;
        }

        writer.start_file(part.path.as_str(), options)?;
        if part.path == main_path {
            writer.write_all(main_markup.as_bytes())?;
        } else {
            writer.write_all(&part.data)?;
        }
    }

    let bytes = writer.finish()?.into_inner();
    debug!("Wrote merged package: {} parts, {} bytes", original.len(), bytes.len());
    Ok(bytes)
}

/// Writes a fresh package around `document_xml`.
pub fn write_fresh(document_xml: &str) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries = [
        (paths::CONTENT_TYPES, parts::CONTENT_TYPES_XML),
        (paths::PACKAGE_RELS, parts::PACKAGE_RELS_XML),
        (paths::DOCUMENT_XML, document_xml),
        (paths::STYLES_XML, parts::STYLES_XML),
        (paths::NUMBERING_XML, parts::NUMBERING_XML),
        (paths::DOCUMENT_RELS, parts::DOCUMENT_RELS_XML),
    ];
    for (path, content) in entries {
        writer.start_file(path, options)?;
        writer.write_all(content.as_bytes())?;
    }

    let bytes = writer.finish()?.into_inner();
    debug!("Wrote fresh package: {} bytes", bytes.len());
    Ok(bytes)
}

/// Entry options reproducing the original entry.
fn entry_options(part: &Part) -> SimpleFileOptions {
    // Only stored and deflated entries can be written back.
    let compression = match part.compression {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    };

    let mut options = SimpleFileOptions::default()
        .compression_method(compression)
        .large_file(part.data.len() as u64 >= u64::from(u32::MAX));
    if let Some(modified) = part.modified {
        options = options.last_modified_time(modified);
    }
    options
}
