use crate::chunking::ChunkingStrategy;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub extraction: Extraction,
    #[serde(default)]
    pub ocr: Ocr,
    #[serde(default)]
    pub chunking: Chunking,
    #[serde(default)]
    pub cleaning: Cleaning,
    #[serde(default)]
    pub sections: Sections,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values that would make the OCR or chunking stages misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.ocr.max_workers == 0 {
            return Err(anyhow!("ocr.max_workers must be at least 1"));
        }
        if self.ocr.image_dpi == 0 {
            return Err(anyhow!("ocr.image_dpi must be positive"));
        }
        if !(1..=100).contains(&self.ocr.jpeg_quality) {
            return Err(anyhow!(
                "ocr.jpeg_quality must be in 1..=100, got {}",
                self.ocr.jpeg_quality
            ));
        }
        if self.chunking.min_chunk_size > self.chunking.max_chunk_size {
            return Err(anyhow!(
                "chunking.min_chunk_size ({}) exceeds chunking.max_chunk_size ({})",
                self.chunking.min_chunk_size,
                self.chunking.max_chunk_size
            ));
        }
        for rule in &self.sections.rules {
            if rule.keywords.is_empty() {
                return Err(anyhow!("section {:?} has no keywords", rule.name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub dataset_dir: String,
    pub output_path: String,
    pub pdfium_lib_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            dataset_dir: "dataset".into(),
            output_path: "processed_documents.json".into(),
            pdfium_lib_dir: "./lib".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_input_file_bytes: u64,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 200 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Extraction {
    pub use_ocr: bool,
}
impl Default for Extraction {
    fn default() -> Self {
        Self { use_ocr: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ocr {
    pub api_base: String,
    pub model: String,
    pub api_key_env: String,
    pub image_dpi: u32,
    pub max_image_size: u32,
    pub jpeg_quality: u8,
    pub max_workers: usize,
    pub api_timeout_seconds: u64,
}
impl Default for Ocr {
    fn default() -> Self {
        Self {
            api_base: "https://api.mistral.ai".into(),
            model: "mistral-ocr-latest".into(),
            api_key_env: "MISTRAL_API_KEY".into(),
            image_dpi: 150,
            max_image_size: 1920,
            jpeg_quality: 85,
            max_workers: 3,
            api_timeout_seconds: 60,
        }
    }
}
impl Ocr {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Chunking {
    pub strategy: ChunkingStrategy,
    pub chunk_size: usize,
    pub overlap: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
}
impl Default for Chunking {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::Hybrid,
            chunk_size: 1200,
            overlap: 150,
            min_chunk_size: 100,
            max_chunk_size: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Cleaning {
    pub normalize_unicode: bool,
}
impl Default for Cleaning {
    fn default() -> Self {
        Self {
            normalize_unicode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sections {
    pub window_chars: usize,
    pub rules: Vec<SectionRule>,
}
impl Default for Sections {
    fn default() -> Self {
        Self {
            window_chars: 2000,
            rules: vec![
                SectionRule::new(
                    "coverage",
                    &["coverage", "covered services", "schedule of benefits"],
                ),
                SectionRule::new(
                    "exclusions",
                    &["exclusions", "what is not covered", "limitations"],
                ),
                SectionRule::new("definitions", &["definitions", "glossary of terms"]),
                SectionRule::new(
                    "cost_sharing",
                    &["cost sharing", "deductible", "copayment", "coinsurance"],
                ),
            ],
        }
    }
}

/// Keywords are tried in listed order; the first one found anywhere wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRule {
    pub name: String,
    pub keywords: Vec<String>,
}
impl SectionRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub write_documents_json: bool,
    pub write_report_json: bool,
    pub report_filename: String,
    pub pretty_json: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_documents_json: true,
            write_report_json: true,
            report_filename: "processing_report.json".into(),
            pretty_json: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "logs/policy-ingest.log".into(),
        }
    }
}
