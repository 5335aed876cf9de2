use crate::{
    chunking::Chunk,
    document::{Document, DocumentMetadata},
    engine::{ExtractionMethod, Table},
    error::ProcessError,
    util::now_rfc3339,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Summary of one batch run, written next to the processed documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub started: String,
    pub finished: Option<String>,
    pub documents_attempted: usize,
    pub documents_processed: usize,
    pub method_counts: BTreeMap<ExtractionMethod, usize>,
    pub documents: Vec<DocumentReport>,
    pub failures: Vec<FailureReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub source: String,
    pub extraction_method: ExtractionMethod,
    pub words: usize,
    pub tables: usize,
    pub sections: Vec<String>,
    pub chunks: usize,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub path: String,
    pub kind: String,
    pub reason: String,
}

impl BatchReport {
    pub fn start() -> Self {
        Self {
            started: now_rfc3339(),
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, doc: &Document) {
        self.documents_attempted += 1;
        self.documents_processed += 1;
        *self
            .method_counts
            .entry(doc.metadata.extraction_method)
            .or_default() += 1;
        self.documents.push(DocumentReport {
            source: doc.metadata.source.clone(),
            extraction_method: doc.metadata.extraction_method,
            words: doc.word_count(),
            tables: doc.tables.len(),
            sections: doc.extracted_sections.keys().cloned().collect(),
            chunks: doc.chunks.len(),
            processing_time_seconds: doc.metadata.processing_time_seconds,
        });
    }

    pub fn record_failure(&mut self, path: &str, err: &ProcessError) {
        self.documents_attempted += 1;
        self.failures.push(FailureReport {
            path: path.to_string(),
            kind: err.kind().to_string(),
            reason: err.to_string(),
        });
    }

    pub fn finish(&mut self) {
        self.finished = Some(now_rfc3339());
    }

    pub fn total_chunks(&self) -> usize {
        self.documents.iter().map(|d| d.chunks).sum()
    }

    /// Human-readable digest printed at the end of `batch`.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Processed {}/{} documents ({} failed, {} chunks)",
            self.documents_processed,
            self.documents_attempted,
            self.failures.len(),
            self.total_chunks()
        );
        if !self.method_counts.is_empty() {
            let _ = writeln!(out, "Extraction methods:");
            for (method, count) in &self.method_counts {
                let _ = writeln!(out, "  {method}: {count}");
            }
        }
        for doc in &self.documents {
            let sections = if doc.sections.is_empty() {
                "none".to_string()
            } else {
                doc.sections.join(", ")
            };
            let _ = writeln!(
                out,
                "  {} [{}] words={} tables={} chunks={} sections={}",
                doc.source, doc.extraction_method, doc.words, doc.tables, doc.chunks, sections
            );
        }
        if !self.failures.is_empty() {
            let _ = writeln!(out, "Failures:");
            for failure in &self.failures {
                let _ = writeln!(out, "  {}: {}", failure.path, failure.reason);
            }
        }
        out
    }
}

/// On-disk shape of a processed document in the batch output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDocument {
    pub file_path: String,
    pub cleaned_text: String,
    pub extracted_sections: BTreeMap<String, String>,
    pub tables: Vec<Table>,
    pub metadata: DocumentMetadata,
    pub chunks: Vec<Chunk>,
}

impl From<&Document> for SavedDocument {
    fn from(doc: &Document) -> Self {
        Self {
            file_path: doc.source_path.clone(),
            cleaned_text: doc.cleaned_text.clone(),
            extracted_sections: doc.extracted_sections.clone(),
            tables: doc.tables.clone(),
            metadata: doc.metadata.clone(),
            chunks: doc.chunks.clone(),
        }
    }
}
