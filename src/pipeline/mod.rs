//! Pipeline stages for PDF page transcription.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. the rendering backend) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! range ──▶ render ──▶ resize ──▶ transcribe ──▶ merge
//! (resolve)  (pdfium)   (image)    (Ollama)      (ordered)
//! ```
//!
//! 1. [`range`]  — validate the requested bounds against the page count,
//!    then resolve open bounds
//! 2. [`layout`] — on-disk staging layout and `page_<N>` naming
//! 3. [`render`] — rasterise the resolved range in order; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 4. [`resize`] — optional in-place width resize, aspect ratio preserved
//! 5. [`merge`]  — concatenate successful pages strictly by page number
//!
//! The transcription loop itself lives in [`crate::run`] — it is the
//! sequencing authority, not a stage.

pub mod layout;
pub mod merge;
pub mod range;
pub mod render;
pub mod resize;
