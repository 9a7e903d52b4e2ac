//! Analysis entry points.
//!
//! The core is [`analyze_text`]: chunk the document, extract fields from at
//! most `max_chunks` chunks one after another, merge them, ask for the
//! report and split it into sections. Everything else wraps it: [`analyze`]
//! reads a PDF from a path or URL, [`analyze_upload`] from uploaded bytes,
//! and [`write_reports`] persists the rendered output.
//!
//! Only two things abort an analysis once text is available: provider
//! resolution and the report call. Extraction failures drop their chunk,
//! and if every chunk is dropped the report is generated from the sentinel
//! values.

use crate::config::{AnalysisConfig, DEFAULT_MODEL};
use crate::error::AnalyzerError;
use crate::merge::merge;
use crate::model::{is_informative, Report};
use crate::output::{AnalysisOutput, AnalysisStats, ChunkOutcome, ReportFiles};
use crate::pipeline::llm::{self, ChatBackend, ProviderBackend};
use crate::pipeline::{chunk, input, render, text};
use crate::sections::parse_report_sections;
use chrono::Local;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Analyse already-extracted document text with the given backend.
///
/// # Errors
/// Only [`AnalyzerError::LlmApiError`] (or whatever the backend returns)
/// from the report call. Failed extraction calls are recorded in
/// [`AnalysisOutput::chunks`] and never returned.
pub async fn analyze_text<B: ChatBackend>(
    backend: &B,
    document_text: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    let total_start = Instant::now();

    // ── Step 1: Chunk ────────────────────────────────────────────────────
    let all_chunks = chunk::split_text(document_text, config.chunk_size, config.chunk_overlap);
    let chunks = &all_chunks[..all_chunks.len().min(config.max_chunks)];
    let total = chunks.len();
    info!(
        "Extracting from {} of {} chunks ({} chars)",
        total,
        all_chunks.len(),
        document_text.chars().count()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start(total);
    }

    // ── Step 2: Extract, one chunk at a time ─────────────────────────────
    let extraction_start = Instant::now();
    let mut results = Vec::with_capacity(total);
    let mut outcomes = Vec::with_capacity(total);
    for (idx, chunk_text) in chunks.iter().enumerate() {
        let chunk_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_chunk_start(chunk_num, total);
        }

        let extraction = llm::extract_chunk(backend, chunk_num, chunk_text).await;
        let mut outcome = ChunkOutcome {
            chunk: chunk_num,
            chars: chunk_text.chars().count(),
            input_tokens: extraction.input_tokens,
            output_tokens: extraction.output_tokens,
            duration_ms: extraction.duration_ms,
            ..Default::default()
        };
        match extraction.result {
            Ok(result) => {
                outcome.fields_found = result.informative_fields();
                if let Some(ref cb) = config.progress_callback {
                    cb.on_chunk_complete(chunk_num, total, outcome.fields_found);
                }
                results.push(result);
            }
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_chunk_error(chunk_num, total, e.to_string());
                }
                outcome.error = Some(e);
            }
        }
        outcomes.push(outcome);
    }
    let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;

    // ── Step 3: Merge ────────────────────────────────────────────────────
    let extracted_info = merge(&results);
    debug!(
        "Merged {} replies; company: {}",
        results.len(),
        extracted_info.company_name()
    );

    // ── Step 4: Report ───────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_report_start();
    }
    let report_start = Instant::now();
    let reply = llm::generate_report_text(backend, &extracted_info).await?;
    let report_duration_ms = report_start.elapsed().as_millis() as u64;

    let sections = parse_report_sections(&reply.content);
    if sections.is_empty() {
        info!("Report text matched no section header; all sections are empty");
    }
    let report = Report::new(sections, &extracted_info);

    // ── Step 5: Stats ────────────────────────────────────────────────────
    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    let stats = AnalysisStats {
        text_chars: document_text.chars().count(),
        total_chunks: all_chunks.len(),
        processed_chunks: total,
        failed_chunks: failed,
        total_input_tokens: outcomes.iter().map(|o| o.input_tokens as u64).sum::<u64>()
            + reply.input_tokens as u64,
        total_output_tokens: outcomes.iter().map(|o| o.output_tokens as u64).sum::<u64>()
            + reply.output_tokens as u64,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        text_duration_ms: 0,
        extraction_duration_ms,
        report_duration_ms,
    };

    info!(
        "Analysis complete: {}/{} chunks merged, {}ms",
        total - failed,
        total,
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(total - failed, total);
    }

    Ok(AnalysisOutput {
        extracted_info,
        report,
        report_text: reply.content,
        chunks: outcomes,
        stats,
    })
}

/// Analyse a PDF file or URL.
///
/// # Errors
/// Input and PDF errors, [`AnalyzerError::NoExtractableText`] when the PDF
/// has no text layer, provider resolution errors, and report-call failure.
pub async fn analyze(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting analysis: {}", input_str);

    let resolved = input::resolve_input(
        input_str,
        config.download_timeout_secs,
        config.max_file_bytes,
    )
    .await?;
    let pdf_path = resolved.path().to_path_buf();

    let text_start = Instant::now();
    let document_text = text::extract_text(&pdf_path, config.password.as_deref()).await?;
    let text_duration_ms = text_start.elapsed().as_millis() as u64;
    if document_text.trim().is_empty() {
        return Err(AnalyzerError::NoExtractableText { path: pdf_path });
    }
    info!(
        "Extracted {} chars in {}ms",
        document_text.chars().count(),
        text_duration_ms
    );

    let provider = resolve_provider(config).await?;
    let backend = ProviderBackend::new(provider, config);

    let mut output = analyze_text(&backend, &document_text, config).await?;
    output.stats.text_duration_ms = text_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Analyse an uploaded PDF held in memory.
///
/// `filename` is only checked for a `.pdf` extension; the bytes are staged in
/// a temporary file that is removed on return.
pub async fn analyze_upload(
    filename: &str,
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    if filename.trim().is_empty() {
        return Err(AnalyzerError::InvalidInput {
            input: filename.to_string(),
        });
    }
    if !input::allowed_file(filename) {
        return Err(AnalyzerError::DisallowedFileType {
            filename: filename.to_string(),
        });
    }
    if bytes.len() as u64 > config.max_file_bytes {
        return Err(AnalyzerError::FileTooLarge {
            path: PathBuf::from(filename),
            size: bytes.len() as u64,
            limit: config.max_file_bytes,
        });
    }
    input::check_magic(Path::new(filename), bytes)?;

    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| AnalyzerError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| AnalyzerError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    debug!("Staged upload '{}' at {}", filename, path);
    // `tmp` is dropped (and the file deleted) when `analyze` returns
    analyze(&path, config).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalyzerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(input_str, config))
}

/// Render both report formats and write them to `dir`.
///
/// Files are named `<YYYYmmdd_HHMMSS>_<company>.{html,md}` and written
/// atomically (temp file + rename), so a reader never sees a partial report.
pub async fn write_reports(
    output: &AnalysisOutput,
    dir: impl AsRef<Path>,
) -> Result<ReportFiles, AnalyzerError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AnalyzerError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let now = Local::now();
    let base = format!(
        "{}_{}",
        now.format("%Y%m%d_%H%M%S"),
        sanitize_company(output.extracted_info.company_name())
    );
    let files = ReportFiles {
        html: dir.join(format!("{base}.html")),
        markdown: dir.join(format!("{base}.md")),
    };

    let html = render::render_html(&output.report, &output.extracted_info, now);
    let markdown = render::render_markdown(&output.report, &output.extracted_info, now);
    write_pair(&files, &html, &markdown).await?;

    info!(
        "Reports written: {} and {}",
        files.html.display(),
        files.markdown.display()
    );
    Ok(files)
}

/// Both temp files are written before either is renamed; a failure at any
/// step removes whatever this call already put on disk.
pub(crate) async fn write_pair(
    files: &ReportFiles,
    html: &str,
    markdown: &str,
) -> Result<(), AnalyzerError> {
    let html_tmp = temp_path(&files.html);
    let md_tmp = temp_path(&files.markdown);

    let result = async {
        write_file(&html_tmp, html).await?;
        write_file(&md_tmp, markdown).await?;
        rename_file(&html_tmp, &files.html).await?;
        if let Err(e) = rename_file(&md_tmp, &files.markdown).await {
            let _ = tokio::fs::remove_file(&files.html).await;
            return Err(e);
        }
        Ok::<(), AnalyzerError>(())
    }
    .await;

    if result.is_err() {
        for leftover in [&html_tmp, &md_tmp] {
            let _ = tokio::fs::remove_file(leftover).await;
        }
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

async fn write_file(path: &Path, contents: &str) -> Result<(), AnalyzerError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| AnalyzerError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

async fn rename_file(from: &Path, to: &Path) -> Result<(), AnalyzerError> {
    tokio::fs::rename(from, to)
        .await
        .map_err(|e| AnalyzerError::OutputWriteFailed {
            path: to.to_path_buf(),
            source: e,
        })
}

/// File-name-safe company name: whitespace becomes `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped, and an empty or sentinel name is `unknown`.
pub fn sanitize_company(name: &str) -> String {
    if !is_informative(name.trim()) {
        return "unknown".to_string();
    }
    let cleaned: String = name
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned.to_string()
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AnalyzerError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. a pre-built provider in `config.provider`;
/// 2. `config.provider_name` with the configured model;
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set;
/// 4. `OPENAI_API_KEY` present: OpenAI with the configured model;
/// 5. whatever `ProviderFactory::from_env` detects.
async fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, config.model_or_default());
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", config.model_or_default());
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AnalyzerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Default model: {}. Error: {}",
                DEFAULT_MODEL, e
            ),
        })?;

    Ok(llm_provider)
}
