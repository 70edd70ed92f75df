//! Error types for the pdf2text-ollama library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2TextError`] — **Fatal**: the run cannot proceed at all (missing
//!   input file, unreachable Ollama endpoint, invalid page range, renderer
//!   failure). Returned as `Err(Pdf2TextError)` from [`crate::run::run`].
//!
//! * [`PageFailure`] — **Non-fatal**: a single page failed (resize glitch,
//!   transport error, malformed response, timeout) but all other pages are
//!   fine. Stored inside [`crate::output::PageRecord`] so callers can inspect
//!   partial success rather than losing the whole document to one bad page.
//!
//! No error from one page's processing ever escapes to abort the run; the
//! binary alone turns a fatal error into a non-zero exit status.

use std::path::PathBuf;
use thiserror::Error;

/// Which end of a requested page range failed validation.
///
/// Carried by [`Pdf2TextError::PageBoundOutOfRange`] so the message can name
/// the offending bound explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeBound::Start => f.write_str("start"),
            RangeBound::End => f.write_str("end"),
        }
    }
}

/// All fatal errors returned by the pdf2text-ollama library.
///
/// Page-level failures use [`PageFailure`] and are stored in
/// [`crate::output::PageRecord`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Service errors ────────────────────────────────────────────────────
    /// The Ollama endpoint did not answer the health probe.
    #[error(
        "Ollama server is not reachable at '{base_url}'.\n\
Start it with `ollama serve` (or point --base-url at a running instance) and try again."
    )]
    ServiceUnavailable { base_url: String },

    // ── Page-range errors ─────────────────────────────────────────────────
    /// A non-zero `start` or `end` lies outside the document.
    #[error("{bound} page {value} is out of range (valid pages: 1-{total})")]
    PageBoundOutOfRange {
        bound: RangeBound,
        value: u32,
        total: u32,
    },

    /// Both bounds are individually valid but inverted.
    #[error("invalid page range {start}-{end}: start must be <= end")]
    InvertedPageRange { start: u32, end: u32 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium returned an error for a specific page. Fatal: a source document
    /// that fails to rasterise cannot be retried per-page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: u32, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the staging directories or write the merged artifact.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A staged per-page text file vanished or became unreadable before the
    /// merge could consume it.
    #[error("Failed to read staged file '{path}': {source}")]
    StagedReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A staged file in the text directory does not follow the `page_<N>`
    /// naming scheme, so its position cannot be determined.
    #[error("staged file '{name}' does not match the page_<N> naming scheme")]
    MalformedPageFile { name: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure for a single page.
///
/// Recorded in [`crate::output::PageRecord`] alongside the page number; the
/// run continues with the next page.
#[derive(Debug, Clone, Error)]
pub enum PageFailure {
    /// The staged image could not be resized.
    #[error("resize failed: {detail}")]
    Resize { detail: String },

    /// The request never produced an HTTP response (connection refused,
    /// DNS failure, broken pipe).
    #[error("transport error: {detail}")]
    Transport { detail: String },

    /// The Ollama API answered with a non-success status.
    #[error("API call failed with status {status}: {body}")]
    Service { status: u16, body: String },

    /// The response body (or a stream chunk) could not be interpreted.
    #[error("malformed response: {detail}")]
    Protocol { detail: String },

    /// The transcription call exceeded the configured timeout.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The transcribed text could not be written to the staging area.
    #[error("failed to store transcription: {detail}")]
    Storage { detail: String },
}
