//! Image encoding: `DynamicImage` → base64 PNG wrapped in `ImageData`.
//!
//! PNG keeps small print crisp for the vision model; `detail: "high"` lets
//! GPT-4-class models tile the page instead of reading a single 512 px
//! overview.

use crate::error::DocTranslateError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode one page image for a vision request.
pub fn encode_page(page: usize, img: &DynamicImage) -> Result<ImageData, DocTranslateError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| DocTranslateError::RasterisationFailed {
            page,
            detail: format!("PNG encoding failed: {e}"),
        })?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page {} → {} bytes base64", page, b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
