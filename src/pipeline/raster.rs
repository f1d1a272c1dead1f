//! Page images for the vision layout backend.
//!
//! PDFs are rasterised with pdfium; image inputs are decoded with the
//! `image` crate. Either way the longest edge is capped at
//! `max_rendered_pixels` so a poster-sized page cannot exhaust memory.
//!
//! pdfium keeps thread-local state and blocks, so all of its work runs
//! inside `tokio::task::spawn_blocking`.

use crate::error::DocTranslateError;
use image::imageops::FilterType;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rasterisation settings taken from [`crate::config::TranslationConfig`].
#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub dpi: u32,
    pub max_rendered_pixels: u32,
    pub password: Option<String>,
}

/// Bind pdfium from `PDFIUM_LIB_PATH`, falling back to the system library.
fn bind_pdfium() -> Result<Pdfium, DocTranslateError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => {
            debug!("Binding pdfium from {}", path);
            Pdfium::bind_to_library(&path)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DocTranslateError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

/// Render every page of a PDF, in order.
///
/// # Returns
/// A vector of `(page_index_0based, DynamicImage)` tuples.
pub async fn render_pdf_pages(
    pdf_path: &Path,
    options: &RasterOptions,
) -> Result<Vec<(usize, DynamicImage)>, DocTranslateError> {
    let path = pdf_path.to_path_buf();
    let options = options.clone();

    tokio::task::spawn_blocking(move || render_pdf_pages_blocking(&path, &options))
        .await
        .map_err(|e| DocTranslateError::Internal(format!("Render task panicked: {e}")))?
}

fn render_pdf_pages_blocking(
    pdf_path: &Path,
    options: &RasterOptions,
) -> Result<Vec<(usize, DynamicImage)>, DocTranslateError> {
    let pdfium = bind_pdfium()?;
    let password = options.password.as_deref();

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_load_error(pdf_path, password.is_some(), format!("{e:?}")))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let max_pixels = options.max_rendered_pixels as i32;
    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let target_width = target_width(page.width().value, options.dpi, max_pixels);
        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_maximum_height(max_pixels);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            DocTranslateError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        results.push((idx, image));
    }

    Ok(results)
}

/// Pixel width for a page `width_pt` points wide at `dpi`, capped.
fn target_width(width_pt: f32, dpi: u32, max_pixels: i32) -> i32 {
    let px = (width_pt * dpi as f32 / 72.0).round() as i32;
    px.clamp(1, max_pixels)
}

fn classify_load_error(path: &Path, had_password: bool, detail: String) -> DocTranslateError {
    let path: PathBuf = path.to_path_buf();
    if detail.to_ascii_lowercase().contains("password") {
        if had_password {
            DocTranslateError::WrongPassword { path }
        } else {
            DocTranslateError::PasswordRequired { path }
        }
    } else {
        DocTranslateError::CorruptPdf { path, detail }
    }
}

/// Decode an image input as a single page.
pub async fn load_image_page(
    image_path: &Path,
    max_rendered_pixels: u32,
) -> Result<Vec<(usize, DynamicImage)>, DocTranslateError> {
    let path = image_path.to_path_buf();

    let image = tokio::task::spawn_blocking(move || image::open(&path))
        .await
        .map_err(|e| DocTranslateError::Internal(format!("Decode task panicked: {e}")))?
        .map_err(|e| DocTranslateError::NotAnImage {
            path: image_path.to_path_buf(),
            detail: e.to_string(),
        })?;

    Ok(vec![(0, cap_image(image, max_rendered_pixels))])
}

/// Downscale so neither edge exceeds `max_pixels`, keeping the aspect ratio.
pub fn cap_image(image: DynamicImage, max_pixels: u32) -> DynamicImage {
    if image.width() <= max_pixels && image.height() <= max_pixels {
        return image;
    }
    debug!(
        "Downscaling {}x{} image to fit {} px",
        image.width(),
        image.height(),
        max_pixels
    );
    image.resize(max_pixels, max_pixels, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn target_width_scales_with_dpi_and_caps() {
        // US Letter is 612pt wide.
        assert_eq!(target_width(612.0, 72, 2000), 612);
        assert_eq!(target_width(612.0, 150, 2000), 1275);
        assert_eq!(target_width(612.0, 400, 2000), 2000);
    }

    #[test]
    fn cap_image_keeps_small_images() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([0, 0, 0])));
        let capped = cap_image(img, 100);
        assert_eq!((capped.width(), capped.height()), (40, 30));
    }

    #[test]
    fn cap_image_preserves_aspect_ratio() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 200, Rgb([255, 255, 255])));
        let capped = cap_image(img, 100);
        assert_eq!((capped.width(), capped.height()), (100, 50));
    }

    #[test]
    fn load_errors_are_classified() {
        let p = Path::new("/tmp/x.pdf");
        assert!(matches!(
            classify_load_error(p, false, "PasswordError".into()),
            DocTranslateError::PasswordRequired { .. }
        ));
        assert!(matches!(
            classify_load_error(p, true, "PasswordError".into()),
            DocTranslateError::WrongPassword { .. }
        ));
        assert!(matches!(
            classify_load_error(p, false, "FormatError".into()),
            DocTranslateError::CorruptPdf { .. }
        ));
    }

    #[tokio::test]
    async fn load_image_page_yields_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        RgbImage::from_pixel(300, 120, Rgb([10, 20, 30])).save(&path).unwrap();

        let pages = load_image_page(&path, 150).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].0, 0);
        assert_eq!(pages[0].1.width(), 150);
    }
}
