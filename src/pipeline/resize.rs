//! Optional in-place resize of staged page images.
//!
//! Vision models read a 1,000–1,500 px page as well as a 3,000 px one but
//! tokenize far fewer image tiles, so downscaling before upload cuts both
//! latency and cost. The height is always recomputed from the image's own
//! aspect ratio, never assumed from the page geometry.
//!
//! A resize failure is a per-page failure, not a fatal one: the page is
//! marked failed and skipped downstream while the rest of the run continues.

use crate::error::PageFailure;
use image::imageops::FilterType;
use std::path::Path;
use tracing::debug;

/// Resize the image at `path` to `width` pixels, preserving aspect ratio,
/// and rewrite the file in place.
pub fn resize_to_width(path: &Path, width: u32) -> Result<(), PageFailure> {
    let img = image::open(path).map_err(|e| PageFailure::Resize {
        detail: format!("cannot read '{}': {e}", path.display()),
    })?;

    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Err(PageFailure::Resize {
            detail: format!("'{}' has a zero dimension ({w}x{h})", path.display()),
        });
    }

    let height = ((u64::from(h) * u64::from(width) + u64::from(w) / 2) / u64::from(w)).max(1) as u32;
    let resized = img.resize_exact(width, height, FilterType::Triangle);

    resized
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| PageFailure::Resize {
            detail: format!("cannot rewrite '{}': {e}", path.display()),
        })?;

    debug!(
        "Resized {} from {}x{} to {}x{}",
        path.display(),
        w,
        h,
        width,
        height
    );
    Ok(())
}
