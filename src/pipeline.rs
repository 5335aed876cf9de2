use crate::{
    chunking::{ChunkParams, chunk_text},
    config::Config,
    document::{ChunkMetadata, Document, DocumentMetadata},
    engine::ExtractionChain,
    error::ProcessError,
    ocr::OcrClient,
    policy,
    postprocess::{SectionExtractor, clean_with},
    probe::{self, FileType},
    report::BatchReport,
    util::now_rfc3339,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extraction chains plus the cleaning and chunking stages for one process.
/// Build it once; the OCR client and its runtime are reused for every document.
pub struct Pipeline {
    cfg: Config,
    sections: SectionExtractor,
    pdf_chain: ExtractionChain,
    docx_chain: ExtractionChain,
}

impl Pipeline {
    pub fn new(cfg: &Config, ocr_client: Option<Arc<dyn OcrClient>>) -> Result<Self> {
        let ocr_available = ocr_client.is_some();
        let pdf = policy::decide(cfg, FileType::Pdf, ocr_available);
        let docx = policy::decide(cfg, FileType::Docx, ocr_available);
        info!(
            "pdf chain: [{}], docx chain: [{}]",
            join_methods(&pdf.methods),
            join_methods(&docx.methods)
        );
        if cfg.extraction.use_ocr && !ocr_available {
            warn!("extraction.use_ocr is set but no OCR client is configured; OCR is skipped");
        }
        let pdf_chain = policy::build_chain(cfg, &pdf, ocr_client.clone())?;
        let docx_chain = policy::build_chain(cfg, &docx, ocr_client)?;
        Self::with_chains(cfg, pdf_chain, docx_chain)
    }

    /// Pipeline over caller-supplied chains.
    pub fn with_chains(
        cfg: &Config,
        pdf_chain: ExtractionChain,
        docx_chain: ExtractionChain,
    ) -> Result<Self> {
        Ok(Self {
            cfg: cfg.clone(),
            sections: SectionExtractor::new(&cfg.sections)?,
            pdf_chain,
            docx_chain,
        })
    }

    /// Chunking parameters from `[chunking]`.
    pub fn default_params(&self) -> ChunkParams {
        ChunkParams {
            strategy: self.cfg.chunking.strategy,
            chunk_size: self.cfg.chunking.chunk_size,
            overlap: self.cfg.chunking.overlap,
        }
    }

    fn chain_for(&self, file_type: FileType) -> &ExtractionChain {
        match file_type {
            FileType::Pdf => &self.pdf_chain,
            FileType::Docx => &self.docx_chain,
        }
    }

    /// Extracts, cleans, sections and chunks one file. Backend and page
    /// failures are absorbed; only a terminal verdict comes back as an error.
    ///
    /// Blocks while OCR runs. Async callers should use `spawn_blocking`.
    pub fn process_document(
        &self,
        path: &Path,
        params: &ChunkParams,
    ) -> Result<Document, ProcessError> {
        params.validate()?;
        let started = Instant::now();

        let probe = probe::probe_input(&self.cfg, path)?;
        info!(
            "processing {} ({}, {} bytes)",
            probe.path, probe.file_type, probe.file_bytes
        );

        let chain = self.chain_for(probe.file_type);
        let outcome = chain.run(path).ok_or_else(|| ProcessError::NoTextExtracted {
            path: probe.path.clone(),
            tried: join_methods(&chain.methods()),
        })?;

        let cleaned_text = clean_with(&self.cfg.cleaning, &outcome.extraction.text);
        let extracted_sections = self.sections.extract(&cleaned_text);
        debug!(
            "{} sections found: {:?}",
            extracted_sections.len(),
            extracted_sections.keys().collect::<Vec<_>>()
        );

        let chunk_started = Instant::now();
        let chunks = chunk_text(&cleaned_text, params);
        let chunking_time_seconds = chunk_started.elapsed().as_secs_f64();

        let chunk_metadata = ChunkMetadata {
            strategy: params.strategy,
            chunk_size: params.chunk_size,
            overlap: params.overlap,
            chunk_count: chunks.len(),
            chunking_time_seconds,
        };

        let metadata = DocumentMetadata {
            source: file_name(path),
            file_type: probe.file_type,
            file_bytes: probe.file_bytes,
            sha256: probe.sha256,
            extraction_method: outcome.method,
            processing_time_seconds: started.elapsed().as_secs_f64(),
            processed_at: now_rfc3339(),
        };

        info!(
            "{}: {} via {}, {} words, {} tables, {} {} chunks in {:.2}s",
            metadata.source,
            probe.file_type,
            outcome.method,
            cleaned_text.split_whitespace().count(),
            outcome.extraction.tables.len(),
            chunk_metadata.chunk_count,
            params.strategy,
            metadata.processing_time_seconds
        );

        Ok(Document {
            source_path: probe.path,
            raw_text: outcome.extraction.text,
            tables: outcome.extraction.tables,
            metadata,
            cleaned_text,
            extracted_sections,
            chunks,
            chunk_metadata,
        })
    }

    /// Processes `inputs` one after another. Failures are recorded in the
    /// report and skipped; nothing is retried.
    pub fn process_batch(&self, inputs: &[PathBuf], params: &ChunkParams) -> BatchOutcome {
        let mut report = BatchReport::start();
        let mut documents = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, inputs.len(), input.display());
            match self.process_document(input, params) {
                Ok(doc) => {
                    report.record_success(&doc);
                    documents.push(doc);
                }
                Err(err) => {
                    warn!("skipping {}: {}", input.display(), err);
                    report.record_failure(&input.display().to_string(), &err);
                }
            }
        }
        report.finish();
        BatchOutcome { documents, report }
    }
}

pub struct BatchOutcome {
    pub documents: Vec<Document>,
    pub report: BatchReport,
}

fn join_methods(methods: &[crate::engine::ExtractionMethod]) -> String {
    methods
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
