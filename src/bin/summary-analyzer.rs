//! CLI binary for exec-summary-analyzer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnalysisConfig`, prints the report and writes the report files.

use anyhow::{Context, Result};
use clap::Parser;
use exec_summary_analyzer::{
    analyze, render_markdown, write_reports, AnalysisConfig, AnalysisOutput,
    AnalysisProgressCallback, ProgressCallback, ReportFiles,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner while the PDF is read, then one bar tick per
/// chunk and a final spinner for the report call.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the chunk currently being extracted. Chunks run one at a time.
    chunk_started: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            chunk_started: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.chunk_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_analysis_start(&self, total_chunks: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:30.green/238}] {pos}/{len} chunks  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.set_length(total_chunks as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting fields from {total_chunks} chunks…"))
        ));
    }

    fn on_chunk_start(&self, chunk: usize, _total: usize) {
        if let Ok(mut started) = self.chunk_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("chunk {chunk}"));
    }

    fn on_chunk_complete(&self, chunk: usize, total: usize, fields_found: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} Chunk {}/{}  {}  {}",
            green("✓"),
            chunk,
            total,
            dim(&format!("{fields_found:>2}/11 fields")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, chunk: usize, total: usize, error: String) {
        let secs = self.elapsed_secs();
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error
        };

        self.bar.println(format!(
            "  {} Chunk {}/{}  {}  {}",
            red("✗"),
            chunk,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_report_start(&self) {
        self.bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&TICKS),
        );
        self.bar.set_prefix("Reporting");
        self.bar.set_message("Writing investment report…");
    }

    fn on_analysis_complete(&self, succeeded_chunks: usize, total_chunks: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} Report generated from {} chunks",
                green("✔"),
                bold(&succeeded_chunks.to_string())
            );
        } else {
            eprintln!(
                "{} Report generated from {}/{} chunks  ({} dropped)",
                if succeeded_chunks == 0 {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&succeeded_chunks.to_string()),
                total_chunks,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a summary; print the Markdown report and save both reports to ./reports
  summary-analyzer executive_summary.pdf

  # Save reports elsewhere
  summary-analyzer deck.pdf -o out/

  # JSON output (extracted fields, report sections, chunk outcomes, stats)
  summary-analyzer --json deck.pdf > analysis.json

  # Print only, write nothing
  summary-analyzer --no-save deck.pdf

  # Use a specific provider and model
  summary-analyzer --provider anthropic --model claude-sonnet-4-20250514 deck.pdf

  # Analyse from a URL
  summary-analyzer https://example.com/summary.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium; the system library is used otherwise

  Variables in a .env file in the working directory are loaded at start-up.
"#;

/// Analyse startup executive summaries with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "summary-analyzer",
    version,
    about = "Turn an executive-summary PDF into an investment analysis report",
    long_about = "Extract eleven key business facts from an executive-summary PDF (local file \
or URL) with a Large Language Model, then generate a four-section investment analysis report \
in Markdown and HTML. Supports OpenAI, Anthropic, Google Gemini, Azure OpenAI, and any \
OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Directory the HTML and Markdown reports are written to.
    #[arg(short, long, env = "SUMMARY_OUTPUT_DIR", default_value = "reports")]
    output_dir: PathBuf,

    /// Do not write report files.
    #[arg(long, env = "SUMMARY_NO_SAVE")]
    no_save: bool,

    /// Output structured JSON (AnalysisOutput) instead of Markdown.
    #[arg(long, env = "SUMMARY_JSON")]
    json: bool,

    /// LLM model ID (default: gpt-4).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_LLM_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "SUMMARY_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "SUMMARY_MAX_TOKENS", default_value_t = 2000)]
    max_tokens: usize,

    /// Chunk length in characters.
    #[arg(long, env = "SUMMARY_CHUNK_SIZE", default_value_t = 2000)]
    chunk_size: usize,

    /// Characters shared between consecutive chunks.
    #[arg(long, env = "SUMMARY_CHUNK_OVERLAP", default_value_t = 200)]
    chunk_overlap: usize,

    /// Maximum number of chunks sent for extraction.
    #[arg(long, env = "SUMMARY_MAX_CHUNKS", default_value_t = 3)]
    max_chunks: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "SUMMARY_PASSWORD")]
    password: Option<String>,

    /// Largest accepted input in bytes.
    #[arg(long, env = "SUMMARY_MAX_FILE_BYTES", default_value_t = 16 * 1024 * 1024)]
    max_file_bytes: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "SUMMARY_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "SUMMARY_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SUMMARY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the report itself.
    #[arg(short, long, env = "SUMMARY_QUIET")]
    quiet: bool,
}

/// `--json` payload: the analysis plus where the reports were written.
#[derive(Serialize)]
struct JsonOutput<'a> {
    success: bool,
    #[serde(flatten)]
    output: &'a AnalysisOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_files: Option<&'a ReportFiles>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO-level library logs are suppressed while the progress bar is
    // active; the bar already reports every stage.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let output = analyze(&cli.input, &config)
        .await
        .context("Analysis failed")?;

    let report_files = if cli.no_save {
        None
    } else {
        Some(
            write_reports(&output, &cli.output_dir)
                .await
                .with_context(|| format!("Failed to save reports to {:?}", cli.output_dir))?,
        )
    };

    if cli.json {
        let payload = JsonOutput {
            success: true,
            output: &output,
            report_files: report_files.as_ref(),
        };
        let json =
            serde_json::to_string_pretty(&payload).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    let markdown = render_markdown(
        &output.report,
        &output.extracted_info,
        chrono::Local::now(),
    );
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(markdown.as_bytes())
        .context("Failed to write to stdout")?;

    if !cli.quiet {
        let stats = &output.stats;
        if !show_progress {
            eprintln!(
                "Merged {}/{} chunks in {}ms",
                stats.processed_chunks - stats.failed_chunks,
                stats.processed_chunks,
                stats.total_duration_ms
            );
        }
        eprintln!(
            "   {} tokens in  /  {} tokens out  —  {}ms total",
            dim(&stats.total_input_tokens.to_string()),
            dim(&stats.total_output_tokens.to_string()),
            stats.total_duration_ms,
        );
        if let Some(files) = &report_files {
            eprintln!(
                "   {}  {}",
                bold(&files.html.display().to_string()),
                bold(&files.markdown.display().to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .max_chunks(cli.max_chunks)
        .max_file_bytes(cli.max_file_bytes)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
