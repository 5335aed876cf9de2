pub mod docx;
pub mod legacy;
pub mod native;
pub mod ocr;
pub mod pdfium;
pub mod types;

use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

pub use types::{Extraction, ExtractionMethod, Table};

/// One way of turning a file into text. Errors are allowed here; the chain
/// turns them into "try the next backend".
pub trait Extractor {
    fn method(&self) -> ExtractionMethod;
    fn extract(&self, path: &Path) -> Result<Extraction>;
}

/// Ordered fallback list for one file type.
pub struct ExtractionChain {
    backends: Vec<Box<dyn Extractor>>,
}

pub struct ChainOutcome {
    pub extraction: Extraction,
    pub method: ExtractionMethod,
}

impl ExtractionChain {
    pub fn new(backends: Vec<Box<dyn Extractor>>) -> Self {
        Self { backends }
    }

    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.backends.iter().map(|b| b.method()).collect()
    }

    /// Runs backends in order and stops at the first non-empty text.
    /// Returns `None` when every backend failed or came back empty.
    pub fn run(&self, path: &Path) -> Option<ChainOutcome> {
        for backend in &self.backends {
            let method = backend.method();
            let started = Instant::now();
            match backend.extract(path) {
                Ok(extraction) if !extraction.is_empty() => {
                    info!(
                        "extracted {} chars and {} tables from {} with {} in {:.2}s",
                        extraction.text.len(),
                        extraction.tables.len(),
                        path.display(),
                        method,
                        started.elapsed().as_secs_f64()
                    );
                    return Some(ChainOutcome { extraction, method });
                }
                Ok(_) => {
                    warn!("{} returned no text for {}", method, path.display());
                }
                Err(err) => {
                    warn!("{} failed for {}: {:#}", method, path.display(), err);
                }
            }
        }
        None
    }
}
