//! Page image preparation for OCR upload: shrink to the configured long
//! edge, drop alpha, encode as JPEG.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

#[derive(Debug, Clone, Copy)]
pub struct ImageSettings {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn optimize_image(image: DynamicImage, settings: &ImageSettings) -> Result<OptimizedImage> {
    let image = downscale(image, settings.max_dimension);
    let image = flatten_to_rgb(image);

    let mut bytes = Vec::new();
    image
        .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, settings.jpeg_quality))
        .context("encoding page as JPEG")?;

    Ok(OptimizedImage {
        bytes,
        width: image.width(),
        height: image.height(),
    })
}

/// Shrinks so the long edge equals `max_dimension`; smaller images pass through.
pub fn downscale(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return image;
    }
    // `resize` keeps the aspect ratio and fits inside the box.
    image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}

/// JPEG has no alpha: composite transparent pixels over white. Anything that
/// is not already 8-bit gray or RGB is converted to RGB8.
pub fn flatten_to_rgb(image: DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        let mut out = RgbImage::new(rgba.width(), rgba.height());
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as u32;
            let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
            out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
        }
        return DynamicImage::ImageRgb8(out);
    }
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
