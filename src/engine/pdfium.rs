// Pdfium helpers. No shared instance: every call binds the library again,
// which keeps `Pdfium` (not `Send`) off the OCR worker threads.
use crate::ocr::PageRenderer;
use anyhow::{Context, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn with_pdfium<F, R>(lib_dir: &Path, f: F) -> Result<R>
where
    F: FnOnce(&Pdfium) -> Result<R>,
{
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(lib_dir))
        .or_else(|_| Pdfium::bind_to_system_library())
        .with_context(|| format!("binding pdfium (looked in {} and system paths)", lib_dir.display()))?;
    let pdfium = Pdfium::new(bindings);
    f(&pdfium)
}

/// Rasterizes every page of a PDF through pdfium.
pub struct PdfiumRenderer {
    lib_dir: PathBuf,
}

impl PdfiumRenderer {
    pub fn new(lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            lib_dir: lib_dir.into(),
        }
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_pages(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        with_pdfium(&self.lib_dir, |pdfium| {
            let document = pdfium
                .load_pdf_from_file(path, None)
                .with_context(|| format!("opening PDF: {}", path.display()))?;
            // PDF user space is 72 points per inch.
            let config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);
            let mut images = Vec::new();
            for (index, page) in document.pages().iter().enumerate() {
                let bitmap = page
                    .render_with_config(&config)
                    .with_context(|| format!("rendering page {}", index + 1))?;
                let image = bitmap.as_image();
                debug!(
                    "rendered page {} at {} dpi ({}x{})",
                    index + 1,
                    dpi,
                    image.width(),
                    image.height()
                );
                images.push(image);
            }
            Ok(images)
        })
    }
}

/// Used by `doctor`: can the library be bound at all?
pub fn probe_library(lib_dir: &Path) -> Result<()> {
    with_pdfium(lib_dir, |_| Ok(()))
}
