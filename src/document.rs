use crate::chunking::{Chunk, ChunkingStrategy};
use crate::engine::{ExtractionMethod, Table};
use crate::probe::FileType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One processed input file. Every derived field is filled in before the
/// pipeline hands the document out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub source_path: String,
    pub raw_text: String,
    pub tables: Vec<Table>,
    pub metadata: DocumentMetadata,
    pub cleaned_text: String,
    pub extracted_sections: BTreeMap<String, String>,
    pub chunks: Vec<Chunk>,
    pub chunk_metadata: ChunkMetadata,
}

impl Document {
    pub fn word_count(&self) -> usize {
        self.cleaned_text.split_whitespace().count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    pub file_type: FileType,
    pub file_bytes: u64,
    pub sha256: String,
    pub extraction_method: ExtractionMethod,
    pub processing_time_seconds: f64,
    pub processed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub strategy: ChunkingStrategy,
    pub chunk_size: usize,
    pub overlap: usize,
    pub chunk_count: usize,
    pub chunking_time_seconds: f64,
}
