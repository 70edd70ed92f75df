//! The page pipeline orchestrator: the run's sequencing authority.
//!
//! One call to [`run`] drives the whole pipeline: input validation, the
//! health gate, page-range resolution, ordered rasterisation, optional
//! resizing, per-page transcription, and the final strict-order merge.
//!
//! ## Sequencing and isolation
//!
//! Pages are transcribed one at a time in increasing page-number order. A
//! local Ollama instance serialises generate calls anyway, so firing pages
//! concurrently buys nothing and muddles per-page diagnostics; the ordered
//! loop also makes the merge-order invariant structural rather than an
//! accident of completion timing. A failure inside one page's processing is
//! recorded on that page and never aborts the run — only setup-stage errors
//! (bad input, unreachable service, invalid range, renderer failure) are
//! fatal.
//!
//! If the driving future is dropped mid-run, the in-flight page request is
//! cancelled with it; pages not yet started are never attempted, and the
//! staged text of completed pages remains on disk for a later
//! [`crate::pipeline::merge::merge_directory`].

use crate::client::{OllamaClient, Transcriber};
use crate::config::RunConfig;
use crate::error::{PageFailure, Pdf2TextError};
use crate::output::{PageRecord, RunOutcome};
use crate::pipeline::layout::RunDirs;
use crate::pipeline::range::PageRange;
use crate::pipeline::render::{self, PageImage};
use crate::pipeline::{merge, resize};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Run the full pipeline against a local Ollama instance.
///
/// # Errors
/// Returns `Err(Pdf2TextError)` only for fatal setup errors; per-page
/// transcription failures are reported through [`RunOutcome::failed`] and the
/// per-page records.
pub async fn run(
    pdf_path: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunOutcome, Pdf2TextError> {
    let client = OllamaClient::from_config(config)?;
    run_with_transcriber(pdf_path.as_ref(), config, &client).await
}

/// Like [`run`], but with a caller-supplied [`Transcriber`].
///
/// This is the injection seam for tests and for callers fronting a different
/// model service behind the same trait.
pub async fn run_with_transcriber<T: Transcriber + ?Sized>(
    pdf_path: &Path,
    config: &RunConfig,
    transcriber: &T,
) -> Result<RunOutcome, Pdf2TextError> {
    info!("Starting transcription run: {}", pdf_path.display());
    validate_input(pdf_path)?;

    // Fail fast before any rendering cost or staging output is produced.
    if !transcriber.ready().await {
        return Err(Pdf2TextError::ServiceUnavailable {
            base_url: config.base_url.clone(),
        });
    }

    let total = render::page_count(pdf_path).await?;
    info!("PDF has {total} pages");
    let range = PageRange::resolve(config.start, config.end, total)?;

    let dirs = RunDirs::create(&config.output_dir)?;
    let pages = render::render_range(pdf_path, range, &dirs, config.max_render_pixels).await?;
    if let Some(progress) = &config.progress {
        progress.on_render_complete(range.start, range.end);
    }

    process_pages(pages, &dirs, config, transcriber).await
}

/// Drive the resize, transcription, cleanup, and merge stages over
/// already-staged page images.
///
/// Public so the post-render pipeline can be exercised (and tested) without
/// a rasterisation backend. Pages are sorted by page number first; the input
/// order carries no meaning.
pub async fn process_pages<T: Transcriber + ?Sized>(
    mut pages: Vec<PageImage>,
    dirs: &RunDirs,
    config: &RunConfig,
    transcriber: &T,
) -> Result<RunOutcome, Pdf2TextError> {
    pages.sort_by_key(|p| p.number);
    let total = pages.len();
    let mut resize_failures: HashMap<u32, PageFailure> = HashMap::new();

    // ── Resize stage ─────────────────────────────────────────────────────
    if config.resize_width > 0 {
        info!("Resizing images to width {}", config.resize_width);
        for (done, page) in pages.iter().enumerate() {
            if let Err(e) = resize::resize_to_width(&page.path, config.resize_width) {
                warn!("Error resizing page {}: {e}", page.number);
                resize_failures.insert(page.number, e);
            }
            if let Some(progress) = &config.progress {
                progress.on_resize(page.number, done + 1, total);
            }
        }
    }

    // ── Transcription stage ──────────────────────────────────────────────
    info!("Transcribing pages");
    let mut records: Vec<PageRecord> = Vec::with_capacity(total);

    for (done, page) in pages.iter().enumerate() {
        if let Some(progress) = &config.progress {
            progress.on_page_start(page.number, done, total);
        }

        let outcome = match resize_failures.remove(&page.number) {
            // resize already failed this page; it is skipped downstream
            Some(failure) => Err(failure),
            None => transcribe_one(page, dirs, config, transcriber).await,
        };

        let record = match outcome {
            Ok((text_path, text_len)) => {
                if let Some(progress) = &config.progress {
                    progress.on_page_complete(page.number, done + 1, total, text_len);
                }
                PageRecord {
                    number: page.number,
                    text_path: Some(text_path),
                    error: None,
                }
            }
            Err(failure) => {
                warn!("Error processing page {}: {failure}", page.number);
                if let Some(progress) = &config.progress {
                    progress.on_page_failed(page.number, done + 1, total, &failure.to_string());
                }
                PageRecord {
                    number: page.number,
                    text_path: None,
                    error: Some(failure),
                }
            }
        };

        // Unconditional post-attempt cleanup: success or failure, the staged
        // image goes unless the caller asked to keep it.
        if !config.keep_images {
            if let Err(e) = std::fs::remove_file(&page.path) {
                warn!(
                    "Could not delete staged image {}: {e}",
                    page.path.display()
                );
            }
        }

        records.push(record);
    }

    // ── Merge stage ──────────────────────────────────────────────────────
    let merged_path = merge::merge_records(&records, &dirs.merged_path())?;

    let succeeded = records.iter().filter(|r| r.succeeded()).count();
    let failed = records.len() - succeeded;
    info!(
        "Run complete: {}/{} pages transcribed ({failed} failed)",
        succeeded,
        records.len()
    );

    Ok(RunOutcome {
        merged_path,
        attempted: records.len(),
        succeeded,
        failed,
        pages: records,
    })
}

async fn transcribe_one<T: Transcriber + ?Sized>(
    page: &PageImage,
    dirs: &RunDirs,
    config: &RunConfig,
    transcriber: &T,
) -> Result<(PathBuf, usize), PageFailure> {
    let image = tokio::fs::read(&page.path)
        .await
        .map_err(|e| PageFailure::Storage {
            detail: format!("cannot read staged image '{}': {e}", page.path.display()),
        })?;

    let text = transcriber.transcribe(&image, &config.model).await?;

    let text_path = dirs.text_path(page.number);
    tokio::fs::write(&text_path, &text)
        .await
        .map_err(|e| PageFailure::Storage {
            detail: format!("cannot write '{}': {e}", text_path.display()),
        })?;

    Ok((text_path, text.len()))
}

/// Check the input exists, is readable, and starts with the PDF magic.
fn validate_input(pdf_path: &Path) -> Result<(), Pdf2TextError> {
    if !pdf_path.exists() {
        return Err(Pdf2TextError::FileNotFound {
            path: pdf_path.to_path_buf(),
        });
    }

    match std::fs::File::open(pdf_path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2TextError::NotAPdf {
                    path: pdf_path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Pdf2TextError::PermissionDenied {
                path: pdf_path.to_path_buf(),
            })
        }
        Err(_) => Err(Pdf2TextError::FileNotFound {
            path: pdf_path.to_path_buf(),
        }),
    }
}
