//! CLI binary for pdf2text-ollama.
//!
//! A thin shim over the library crate that maps CLI flags to `RunConfig`,
//! renders a progress bar, and prints the summary. Per-page transcription
//! failures never change the exit code; only fatal setup errors do.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2text_ollama::{run, RunConfig, RunProgress};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress sink using indicatif ────────────────────────────────────────

/// Terminal progress sink: one bar at the bottom, one log line per page.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Bar starts as a spinner; the length is known only after rendering.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: u64) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Transcribing");
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RunProgress for CliProgress {
    fn on_render_complete(&self, first_page: u32, last_page: u32) {
        let total = u64::from(last_page - first_page + 1);
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Rendered pages {first_page}–{last_page}, starting transcription…"
            ))
        ));
    }

    fn on_resize(&self, page: u32, done: usize, total: usize) {
        self.bar
            .set_message(format!("resizing page {page} ({done}/{total})"));
    }

    fn on_page_start(&self, page: u32, _done: usize, _total: usize) {
        self.bar.set_message(format!("page {page}"));
    }

    fn on_page_complete(&self, page: u32, done: usize, total: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3} ({done}/{total})  {}",
            green("✓"),
            page,
            dim(&format!("{text_len:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_page_failed(&self, page: u32, done: usize, total: usize, error: &str) {
        let msg = truncate_message(error, 80);
        self.bar.println(format!(
            "  {} Page {:>3} ({done}/{total})  {}",
            red("✗"),
            page,
            red(&msg),
        ));
        self.bar.inc(1);
    }
}

/// Keep long error messages on one tidy line. Truncation counts characters,
/// not bytes; service error bodies are not guaranteed to be ASCII.
fn truncate_message(error: &str, max_chars: usize) -> String {
    if error.chars().count() <= max_chars {
        return error.to_string();
    }
    let mut msg: String = error.chars().take(max_chars - 1).collect();
    msg.push('\u{2026}');
    msg
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Transcribe a whole document with the default model
  pdf2text book.pdf

  # Pages 10-25 only, into a named output directory
  pdf2text book.pdf -s 10 -e 25 -o book_excerpt

  # Downscale images to 1200 px wide and keep them on disk
  pdf2text scan.pdf -w 1200 --keep-images

  # Use another vision model and echo the merged text to stdout
  pdf2text notes.pdf -m llama3.2-vision --stdout

  # Point at a remote Ollama instance
  pdf2text doc.pdf --base-url http://gpu-box:11434

OUTPUT LAYOUT:
  <output>/images/page_<N>.png   staged renders (deleted after use unless -k)
  <output>/text/page_<N>.txt     per-page transcriptions
  <output>/merged_output.txt     the final ordered artifact

EXIT STATUS:
  0  run completed (individual page failures are reported but not fatal)
  1  missing document, unreachable Ollama server, invalid page range,
     or a fatal rendering error

SETUP:
  1. Install a vision model:   ollama pull qwen2.5vl:latest
  2. Start the server:         ollama serve
  3. Transcribe:               pdf2text document.pdf
"#;

/// Transcribe PDF pages to text using Ollama vision models.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2text",
    version,
    about = "Transcribe PDF pages to text using Ollama vision models",
    long_about = "Convert each page of a PDF to an image, transcribe the images with a \
vision-capable Ollama model, and merge the per-page results into a single ordered text file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the input PDF file.
    input: PathBuf,

    /// Output directory (default: output_<timestamp>).
    #[arg(short, long, env = "PDF2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Ollama model to use.
    #[arg(short, long, env = "PDF2TEXT_MODEL", default_value = pdf2text_ollama::DEFAULT_MODEL)]
    model: String,

    /// Base URL of the Ollama server.
    #[arg(long, env = "PDF2TEXT_BASE_URL", default_value = pdf2text_ollama::DEFAULT_BASE_URL)]
    base_url: String,

    /// Keep the intermediate image files.
    #[arg(short, long, env = "PDF2TEXT_KEEP_IMAGES")]
    keep_images: bool,

    /// Width of the resized images in pixels. 0 skips resizing.
    #[arg(short, long, env = "PDF2TEXT_WIDTH", default_value_t = 0)]
    width: u32,

    /// Start page number (1-based). 0 starts at the first page.
    #[arg(short, long, default_value_t = 0)]
    start: u32,

    /// End page number (1-based, inclusive). 0 goes to the last page.
    #[arg(short, long, default_value_t = 0)]
    end: u32,

    /// Write the merged output to stdout after the run.
    #[arg(long)]
    stdout: bool,

    /// Request a streamed response and use only the terminal chunk.
    #[arg(long, env = "PDF2TEXT_STREAM")]
    stream: bool,

    /// Per-page transcription timeout in seconds.
    #[arg(long, env = "PDF2TEXT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TEXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs duplicate the progress bar, so suppress them while
    // the bar is active unless the user asked for verbosity.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let output_dir = cli.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!(
            "output_{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    let progress = if show_progress {
        Some(CliProgress::new_dynamic())
    } else {
        None
    };

    let mut builder = RunConfig::builder()
        .output_dir(&output_dir)
        .model(&cli.model)
        .base_url(&cli.base_url)
        .page_range(cli.start, cli.end)
        .resize_width(cli.width)
        .keep_images(cli.keep_images)
        .stream(cli.stream)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref p) = progress {
        builder = builder.progress(Arc::clone(p) as Arc<dyn RunProgress>);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let result = run(&cli.input, &config).await;

    if let Some(ref p) = progress {
        p.finish();
    }

    let outcome = result.context("Transcription run failed")?;

    if cli.stdout {
        let merged = std::fs::read_to_string(&outcome.merged_path)
            .with_context(|| format!("Failed to read {}", outcome.merged_path.display()))?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(merged.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet {
        let tick = if outcome.failed == 0 {
            green("✔")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{tick} {}/{} pages transcribed{}",
            bold(&outcome.succeeded.to_string()),
            outcome.attempted,
            if outcome.failed > 0 {
                format!("  ({} failed)", red(&outcome.failed.to_string()))
            } else {
                String::new()
            },
        );
        eprintln!(
            "{} Processing complete! Output saved to: {}",
            dim("→"),
            bold(&output_dir.display().to_string())
        );
    }

    Ok(())
}
