use super::pdfium::with_pdfium;
use super::{Extraction, ExtractionMethod, Extractor};
use crate::tables::tables_from_markdown;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Text layer embedded in the PDF, read page by page through pdfium.
///
/// Pdfium exposes no table structure, so tables are only recovered when the
/// text layer itself carries pipe-delimited rows.
pub struct NativeTextExtractor {
    lib_dir: PathBuf,
}

impl NativeTextExtractor {
    pub fn new(lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            lib_dir: lib_dir.into(),
        }
    }
}

impl Extractor for NativeTextExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::NativeText
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        with_pdfium(&self.lib_dir, |pdfium| {
            let document = pdfium
                .load_pdf_from_file(path, None)
                .with_context(|| format!("opening PDF: {}", path.display()))?;

            let mut text = String::new();
            let mut tables = Vec::new();
            for (index, page) in document.pages().iter().enumerate() {
                let page_text = page
                    .text()
                    .with_context(|| format!("reading text layer of page {}", index + 1))?
                    .all();
                if page_text.trim().is_empty() {
                    debug!("page {} has no text layer", index + 1);
                    continue;
                }
                tables.extend(tables_from_markdown(&page_text));
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(Extraction::new(text, tables))
        })
    }
}
