use crate::{config::Config, error::ProcessError, util::hash_file};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    /// Case-insensitive extension match; anything else is unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileType::Pdf),
            "docx" => Some(FileType::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Pdf => ".pdf",
            FileType::Docx => ".docx",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub path: String,
    pub file_bytes: u64,
    pub file_type: FileType,
    pub sha256: String,
}

/// Cheap checks before any backend runs: the type is supported, the file
/// exists and is within `limits.max_input_file_bytes`.
pub fn probe_input(cfg: &Config, input: &Path) -> Result<ProbeResult, ProcessError> {
    let file_type = FileType::from_path(input).ok_or_else(|| {
        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_else(|| "(none)".to_string());
        ProcessError::UnsupportedFileType(ext)
    })?;

    let meta = std::fs::metadata(input).map_err(|e| {
        ProcessError::InputRejected(format!("cannot stat {}: {e}", input.display()))
    })?;
    if !meta.is_file() {
        return Err(ProcessError::InputRejected(format!(
            "{} is not a regular file",
            input.display()
        )));
    }
    let file_bytes = meta.len();
    if file_bytes > cfg.limits.max_input_file_bytes {
        return Err(ProcessError::InputRejected(format!(
            "{} is {} bytes, over max_input_file_bytes ({})",
            input.display(),
            file_bytes,
            cfg.limits.max_input_file_bytes
        )));
    }

    let sha256 = hash_file(input).map_err(|e| {
        ProcessError::InputRejected(format!("hashing {}: {e:#}", input.display()))
    })?;

    Ok(ProbeResult {
        path: input.display().to_string(),
        file_bytes,
        file_type,
        sha256,
    })
}
