//! # pdf2text-ollama
//!
//! Transcribe PDF documents to plain text with a locally running Ollama
//! vision model.
//!
//! Each page is rasterised to a PNG, optionally downscaled, sent to the
//! model's generate endpoint with a fixed transcription prompt, and the
//! per-page results are reassembled into one ordered artifact. A single bad
//! page — a transient API error, a timeout, a resize glitch — is recorded
//! and skipped; it never takes the rest of the document down with it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Health   probe the Ollama endpoint before any rendering work
//!  ├─ 2. Range    validate and resolve the requested [start, end] pages
//!  ├─ 3. Render   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 4. Resize   optional width resize, aspect ratio preserved
//!  ├─ 5. Model    per-page generate calls, strictly in page order
//!  └─ 6. Merge    successful pages joined by page number, blank-line separated
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2text_ollama::{run, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder()
//!         .output_dir("out")
//!         .model("qwen2.5vl:latest")
//!         .build()?;
//!     let outcome = run("document.pdf", &config).await?;
//!     eprintln!(
//!         "{}/{} pages transcribed -> {}",
//!         outcome.succeeded,
//!         outcome.attempted,
//!         outcome.merged_path.display()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Output Layout
//!
//! ```text
//! <output_dir>/
//!   images/page_<N>.png    staged renders (deleted post-attempt by default)
//!   text/page_<N>.txt      per-page transcriptions
//!   merged_output.txt      the final ordered artifact
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2text` binary (clap + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{OllamaClient, Transcriber};
pub use config::{RunConfig, RunConfigBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{PageFailure, Pdf2TextError, RangeBound};
pub use output::{PageRecord, RunOutcome};
pub use pipeline::range::PageRange;
pub use progress::{NoopProgress, ProgressSink, RunProgress};
pub use run::{run, run_with_transcriber};
