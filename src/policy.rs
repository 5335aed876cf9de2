use crate::{
    config::Config,
    engine::{
        ExtractionChain, ExtractionMethod, Extractor, docx::DocxExtractor,
        legacy::LegacyTextExtractor, native::NativeTextExtractor, ocr::OcrExtractor,
        pdfium::PdfiumRenderer,
    },
    ocr::{OcrBatchCoordinator, OcrClient, OcrSettings},
    probe::FileType,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub file_type: FileType,
    pub methods: Vec<ExtractionMethod>,
}

/// Backend order for a file type. OCR leads the PDF chain only when it is
/// switched on and a client is available.
pub fn decide(cfg: &Config, file_type: FileType, ocr_available: bool) -> PolicyDecision {
    let methods = match file_type {
        FileType::Pdf => {
            let mut m = Vec::with_capacity(3);
            if cfg.extraction.use_ocr && ocr_available {
                m.push(ExtractionMethod::OcrBatch);
            }
            m.push(ExtractionMethod::NativeText);
            m.push(ExtractionMethod::LegacyText);
            m
        }
        FileType::Docx => vec![ExtractionMethod::DocxStructure],
    };
    PolicyDecision { file_type, methods }
}

/// Instantiates the backends named by `decision`, in order.
pub fn build_chain(
    cfg: &Config,
    decision: &PolicyDecision,
    ocr_client: Option<Arc<dyn OcrClient>>,
) -> Result<ExtractionChain> {
    let mut backends: Vec<Box<dyn Extractor>> = Vec::with_capacity(decision.methods.len());
    for method in &decision.methods {
        match method {
            ExtractionMethod::OcrBatch => {
                if let Some(client) = ocr_client.clone() {
                    let coordinator = OcrBatchCoordinator::new(
                        client,
                        Box::new(PdfiumRenderer::new(&cfg.paths.pdfium_lib_dir)),
                        OcrSettings::from_config(&cfg.ocr),
                    )?;
                    backends.push(Box::new(OcrExtractor::new(coordinator)));
                }
            }
            ExtractionMethod::NativeText => {
                backends.push(Box::new(NativeTextExtractor::new(&cfg.paths.pdfium_lib_dir)))
            }
            ExtractionMethod::LegacyText => backends.push(Box::new(LegacyTextExtractor)),
            ExtractionMethod::DocxStructure => backends.push(Box::new(DocxExtractor)),
        }
    }
    Ok(ExtractionChain::new(backends))
}
