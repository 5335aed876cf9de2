//! Page-parallel OCR of rendered PDFs.

pub mod batch;
pub mod client;

use crate::engine::{Extraction, Table};
use crate::tables::tables_from_markdown;
use anyhow::Result;
use image::DynamicImage;
use std::path::Path;

pub use batch::{OcrBatchCoordinator, OcrSettings, WORKER_THREAD_NAME};
pub use client::{MistralOcrClient, OcrClient, OcrError, OcrPage, OcrResponse};

/// Turns a PDF into one image per page, in page order. Failing here fails
/// the whole OCR attempt.
pub trait PageRenderer {
    fn render_pages(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;
}

/// Outcome of one page. A failed page carries empty text and no tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub page_index: usize,
    pub text: String,
    pub tables: Vec<Table>,
    pub succeeded: bool,
}

impl PageResult {
    pub fn failed(page_index: usize) -> Self {
        Self {
            page_index,
            ..Default::default()
        }
    }

    pub fn from_response(page_index: usize, response: &OcrResponse) -> Self {
        let mut text = String::new();
        let mut tables = Vec::new();
        for page in &response.pages {
            if page.markdown.is_empty() {
                continue;
            }
            text.push_str(&page.markdown);
            text.push_str("\n\n");
            tables.extend(tables_from_markdown(&page.markdown));
        }
        Self {
            page_index,
            text,
            tables,
            succeeded: true,
        }
    }
}

pub fn page_marker(page_index: usize) -> String {
    format!("\n--- Page {} ---\n", page_index + 1)
}

/// Orders page results by index and joins them, a marker before every page
/// position (failed pages included). Tables follow the same order.
/// Returns an empty extraction when no page produced text.
pub fn reassemble(mut results: Vec<PageResult>) -> Extraction {
    results.sort_by_key(|r| r.page_index);
    if results.iter().all(|r| r.text.trim().is_empty()) {
        return Extraction::empty();
    }

    let mut text = String::new();
    let mut tables = Vec::new();
    for result in results {
        text.push_str(&page_marker(result.page_index));
        text.push_str(&result.text);
        tables.extend(result.tables);
    }
    Extraction::new(text.trim().to_string(), tables)
}
