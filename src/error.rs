use thiserror::Error;

/// Terminal outcome for a single document. Backend and page failures never
/// surface here; they are absorbed by the extraction chain.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("invalid chunking parameters: {0}")]
    InvalidChunking(String),
    #[error("unsupported file type: {0}. Only PDF and DOCX files are supported")]
    UnsupportedFileType(String),
    #[error("input rejected: {0}")]
    InputRejected(String),
    #[error("could not extract text from {path} using any method (tried: {tried})")]
    NoTextExtracted { path: String, tried: String },
}

impl ProcessError {
    /// Short machine-friendly tag for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::InvalidChunking(_) => "invalid_chunking",
            ProcessError::UnsupportedFileType(_) => "unsupported_file_type",
            ProcessError::InputRejected(_) => "input_rejected",
            ProcessError::NoTextExtracted { .. } => "no_text_extracted",
        }
    }
}
