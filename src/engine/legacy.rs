use super::{Extraction, ExtractionMethod, Extractor};
use anyhow::{Context, Result};
use std::path::Path;

/// Last resort for PDFs: pure-Rust text extraction, no tables.
pub struct LegacyTextExtractor;

impl Extractor for LegacyTextExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::LegacyText
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .with_context(|| format!("pdf-extract failed for {}", path.display()))?;
        // pdf-extract separates pages with form feeds.
        let text = text.replace('\x0C', "\n");
        Ok(Extraction::new(text, Vec::new()))
    }
}
