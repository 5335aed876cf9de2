use serde::{Deserialize, Serialize};
use std::fmt;

/// Rows of optional cells. `None` is a cell the source did not provide,
/// which is different from an empty string.
pub type Table = Vec<Vec<Option<String>>>;

/// What a backend produced for one file. Empty text means "try the next one".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    pub tables: Vec<Table>,
}

impl Extraction {
    pub fn new(text: String, tables: Vec<Table>) -> Self {
        Self { text, tables }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    OcrBatch,
    NativeText,
    LegacyText,
    DocxStructure,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::OcrBatch => "ocr_batch",
            ExtractionMethod::NativeText => "native_text",
            ExtractionMethod::LegacyText => "legacy_text",
            ExtractionMethod::DocxStructure => "docx_structure",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
