use crate::{Error, Result, uploads::Upload};
use async_trait::async_trait;
use quick_xml::{Reader, events::Event};
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

const DOCUMENT_XML: &str = "word/document.xml";

/// Default cap on the decompressed size of `word/document.xml`.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

/// Turns a staged office document into plain text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, upload: &Upload) -> Result<String>;
}

/// Raw-text extractor for `.docx` (WordprocessingML) files.
///
/// Runs are concatenated, tabs and breaks are kept, and every paragraph ends with a
/// blank line. The document part is never inflated past `max_document_bytes`.
#[derive(Debug, Clone, Copy)]
pub struct DocxExtractor {
    max_document_bytes: u64,
}

impl DocxExtractor {
    pub fn new(max_document_bytes: u64) -> Self {
        Self { max_document_bytes }
    }

    pub fn max_document_bytes(&self) -> u64 {
        self.max_document_bytes
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract(&self, upload: &Upload) -> Result<String> {
        let path = upload.path().to_path_buf();
        let limit = self.max_document_bytes;

        let text = tokio::task::spawn_blocking(move || extract_docx_text(&path, limit))
            .await
            .map_err(|e| Error::internal(format!("Document extraction task failed: {}", e)))??;

        debug!(
            "Extracted {} characters from {}",
            text.len(),
            upload.path().display()
        );
        Ok(text)
    }
}

/// Reads `word/document.xml` out of the archive at `path` and flattens it to text.
///
/// Fails with `Error::Extraction` once the inflated part passes `max_bytes`, whatever
/// size the archive header declares.
pub fn extract_docx_text(path: &Path, max_bytes: u64) -> Result<String> {
    let file = File::open(path)?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::extraction(format!("Not a valid .docx archive: {}", e)))?;

    let entry = archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| Error::extraction(format!("Missing {}: {}", DOCUMENT_XML, e)))?;

    if entry.size() > max_bytes {
        return Err(too_large(max_bytes));
    }

    let mut xml = Vec::new();
    entry
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut xml)
        .map_err(|e| Error::extraction(format!("Unreadable {}: {}", DOCUMENT_XML, e)))?;

    if xml.len() as u64 > max_bytes {
        return Err(too_large(max_bytes));
    }

    let xml = String::from_utf8(xml)
        .map_err(|e| Error::extraction(format!("Unreadable {}: {}", DOCUMENT_XML, e)))?;

    document_xml_to_text(&xml)
}

fn too_large(max_bytes: u64) -> Error {
    Error::extraction(format!(
        "{} exceeds the {} byte limit",
        DOCUMENT_XML, max_bytes
    ))
}

pub fn document_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut run_depth = 0usize;
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::extraction(format!("Malformed document XML: {}", e)))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:r" => run_depth += 1,
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text_run = false,
                b"w:p" => text.push_str("\n\n"),
                _ => {}
            },
            // Tab stops in `w:pPr/w:tabs` share the `w:tab` name; only run content counts.
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if run_depth > 0 => text.push('\t'),
                b"w:br" | b"w:cr" if run_depth > 0 => text.push('\n'),
                b"w:p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Text(e) if in_text_run => {
                let unescaped = e
                    .unescape()
                    .map_err(|e| Error::extraction(format!("Invalid text run: {}", e)))?;
                text.push_str(&unescaped);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
