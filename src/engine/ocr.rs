use super::{Extraction, ExtractionMethod, Extractor};
use crate::ocr::OcrBatchCoordinator;
use anyhow::Result;
use std::path::Path;

/// OCR over rendered pages; first in the PDF chain when enabled.
pub struct OcrExtractor {
    coordinator: OcrBatchCoordinator,
}

impl OcrExtractor {
    pub fn new(coordinator: OcrBatchCoordinator) -> Self {
        Self { coordinator }
    }
}

impl Extractor for OcrExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::OcrBatch
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        self.coordinator.extract(path)
    }
}
