//! PDF rasterisation: render the resolved range into the image staging area.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a thread designed for
//! blocking operations so the async workers driving HTTP stay responsive.
//!
//! Any rasterisation error is fatal to the run: a source document that
//! pdfium cannot read will not read better on a second attempt, so there is
//! no per-page recovery at this stage.

use crate::error::Pdf2TextError;
use crate::pipeline::layout::RunDirs;
use crate::pipeline::range::PageRange;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One staged page image. The page number travels with the record from
/// creation onward; it is the sole ordering key downstream.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number within the source document.
    pub number: u32,
    /// Location of the staged PNG.
    pub path: PathBuf,
}

/// Total number of pages in the document.
pub async fn page_count(pdf_path: &Path) -> Result<u32, Pdf2TextError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || page_count_blocking(&path))
        .await
        .map_err(|e| Pdf2TextError::Internal(format!("page-count task panicked: {e}")))?
}

fn page_count_blocking(pdf_path: &Path) -> Result<u32, Pdf2TextError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;
    Ok(u32::from(document.pages().len()))
}

/// Rasterise the pages of `range` in increasing order into the image staging
/// area, returning one [`PageImage`] per page in that same order.
pub async fn render_range(
    pdf_path: &Path,
    range: PageRange,
    dirs: &RunDirs,
    max_pixels: u32,
) -> Result<Vec<PageImage>, Pdf2TextError> {
    let path = pdf_path.to_path_buf();
    let dirs = dirs.clone();
    tokio::task::spawn_blocking(move || render_range_blocking(&path, range, &dirs, max_pixels))
        .await
        .map_err(|e| Pdf2TextError::Internal(format!("render task panicked: {e}")))?
}

fn render_range_blocking(
    pdf_path: &Path,
    range: PageRange,
    dirs: &RunDirs,
    max_pixels: u32,
) -> Result<Vec<PageImage>, Pdf2TextError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;
    let pages = document.pages();
    info!(
        "Converting pages {} to {} to images",
        range.start, range.end
    );

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut staged = Vec::with_capacity(range.len() as usize);

    for number in range.pages() {
        let page = pages
            .get((number - 1) as u16)
            .map_err(|e| Pdf2TextError::RenderFailed {
                page: number,
                detail: format!("{e:?}"),
            })?;

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| Pdf2TextError::RenderFailed {
                    page: number,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image();
        let out_path = dirs.image_path(number);
        image
            .save_with_format(&out_path, image::ImageFormat::Png)
            .map_err(|e| Pdf2TextError::RenderFailed {
                page: number,
                detail: format!("PNG encoding failed: {e}"),
            })?;

        debug!(
            "Rendered page {} -> {}x{} px at {}",
            number,
            image.width(),
            image.height(),
            out_path.display()
        );

        staged.push(PageImage {
            number,
            path: out_path,
        });
    }

    info!("Converted {} pages to images", staged.len());
    Ok(staged)
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
) -> Result<PdfDocument<'a>, Pdf2TextError> {
    pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Pdf2TextError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{e:?}"),
        })
}
