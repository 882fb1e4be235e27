//! Image payload validation
//!
//! Generated images are always stored as PNG. Payloads are decoded once to
//! make sure they are real images; anything that is not already PNG is
//! re-encoded.

pub mod mime;

pub use mime::{detect_image_mime, is_png};

use crate::Result;
use image::ImageFormat;
use std::io::Cursor;

/// Validate `bytes` as an image and return PNG-encoded bytes.
///
/// PNG input is returned unchanged.
pub fn ensure_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;

    if is_png(bytes) {
        return Ok(bytes.to_vec());
    }

    tracing::info!(
        "Transcoding {} payload ({}x{}) to PNG",
        detect_image_mime(bytes).unwrap_or("unknown"),
        img.width(),
        img.height()
    );
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}
