//! Configuration for a transcription run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share a config across stages and to diff two runs when their outputs
//! differ. The builder validates in `build()` so an impossible configuration
//! never reaches the pipeline.

use crate::error::Pdf2TextError;
use crate::progress::ProgressSink;
use std::fmt;
use std::path::PathBuf;

/// Default Ollama endpoint for a local installation.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default vision model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "qwen2.5vl:latest";

/// Configuration for one pipeline run.
///
/// Built via [`RunConfig::builder()`] or [`RunConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2text_ollama::RunConfig;
///
/// let config = RunConfig::builder()
///     .output_dir("out")
///     .model("llama3.2-vision")
///     .page_range(2, 5)
///     .resize_width(1200)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Root of the run's output layout (`images/`, `text/`,
    /// `merged_output.txt`). Default: `output`.
    pub output_dir: PathBuf,

    /// Ollama model identifier, e.g. `qwen2.5vl:latest`.
    pub model: String,

    /// Base URL of the Ollama server. Default: `http://localhost:11434`.
    pub base_url: String,

    /// First page to process, 1-based. `0` means "from the first page".
    pub start: u32,

    /// Last page to process, 1-based inclusive. `0` means "to the last page".
    pub end: u32,

    /// Target width for staged images, preserving aspect ratio.
    /// `0` disables resizing. Default: 0.
    pub resize_width: u32,

    /// Keep staged page images after their transcription attempt.
    /// Default: false — each image is deleted right after its attempt so peak
    /// disk usage stays bounded to one image beyond what is already merged.
    pub keep_images: bool,

    /// Ask the endpoint for a streamed response and read only the terminal
    /// chunk. Default: false (single non-streaming request, as the wire
    /// protocol intends for one-shot transcription).
    pub stream: bool,

    /// Per-page transcription call timeout in seconds. Default: 120.
    ///
    /// Vision models can take a minute per dense page on modest hardware;
    /// a hung connection must still not stall the rest of the run.
    pub api_timeout_secs: u64,

    /// Health-probe timeout in seconds. Default: 5.
    pub health_timeout_secs: u64,

    /// Longest rendered edge in pixels. Caps memory regardless of page size
    /// the way a DPI setting cannot (an A0 poster and an A5 booklet both stay
    /// bounded). Default: 2000.
    pub max_render_pixels: u32,

    /// Optional progress sink receiving per-page events.
    pub progress: Option<ProgressSink>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            start: 0,
            end: 0,
            resize_width: 0,
            keep_images: false,
            stream: false,
            api_timeout_secs: 120,
            health_timeout_secs: 5,
            max_render_pixels: 2000,
            progress: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("output_dir", &self.output_dir)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("resize_width", &self.resize_width)
            .field("keep_images", &self.keep_images)
            .field("stream", &self.stream)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn RunProgress>"))
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Requested page range, 1-based inclusive; `0` leaves a bound open.
    pub fn page_range(mut self, start: u32, end: u32) -> Self {
        self.config.start = start;
        self.config.end = end;
        self
    }

    pub fn resize_width(mut self, width: u32) -> Self {
        self.config.resize_width = width;
        self
    }

    pub fn keep_images(mut self, keep: bool) -> Self {
        self.config.keep_images = keep;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.config.stream = stream;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn health_timeout_secs(mut self, secs: u64) -> Self {
        self.config.health_timeout_secs = secs;
        self
    }

    pub fn max_render_pixels(mut self, px: u32) -> Self {
        self.config.max_render_pixels = px.max(100);
        self
    }

    pub fn progress(mut self, sink: ProgressSink) -> Self {
        self.config.progress = Some(sink);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, Pdf2TextError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(Pdf2TextError::InvalidConfig(
                "model must not be empty".into(),
            ));
        }
        if c.base_url.trim().is_empty() {
            return Err(Pdf2TextError::InvalidConfig(
                "base_url must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(Pdf2TextError::InvalidConfig(
                "api_timeout_secs must be >= 1".into(),
            ));
        }
        Ok(self.config)
    }
}
