//! # exec-summary-analyzer
//!
//! Turn a startup's executive-summary PDF into a structured investment
//! analysis with a Large Language Model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file, URL or upload; check %PDF and size
//!  ├─ 2. Text     pdfium, falling back to pdf-extract (spawn_blocking)
//!  ├─ 3. Chunk    2 000-char chunks, 200-char overlap, first 3 kept
//!  ├─ 4. Extract  one LLM call per chunk → eleven fields + confidences
//!  ├─ 5. Merge    per field, highest confidence wins, first seen on ties
//!  ├─ 6. Report   one LLM call → four keyword-delimited sections
//!  └─ 7. Output   AnalysisOutput; Markdown and HTML reports on request
//! ```
//!
//! A chunk whose call or reply fails is dropped; the analysis still
//! succeeds, with [`NOT_PROVIDED`] in every field nobody answered. Only a
//! failed report call aborts it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exec_summary_analyzer::{analyze, write_reports, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = AnalysisConfig::default();
//!     let output = analyze("executive_summary.pdf", &config).await?;
//!     println!("{}", output.extracted_info.company_name());
//!     let files = write_reports(&output, "reports").await?;
//!     eprintln!("wrote {}", files.markdown.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `summary-analyzer` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! exec-summary-analyzer = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod sections;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_sync, analyze_text, analyze_upload, sanitize_company, write_reports};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, DEFAULT_MODEL};
pub use error::{AnalyzerError, ChunkError};
pub use merge::merge;
pub use model::{
    ExtractedInformation, ExtractionResult, Field, FieldSet, Report, ReportMetadata,
    ReportSections, Section, NOT_PROVIDED,
};
pub use output::{AnalysisOutput, AnalysisStats, ChunkOutcome, ReportFiles};
pub use pipeline::llm::{ChatBackend, ChatReply, ProviderBackend};
pub use pipeline::render::{parse_summary_table, render_html, render_markdown};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use sections::parse_report_sections;
