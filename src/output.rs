//! Output types returned by the `analyze*` entry points.

use crate::error::ChunkError;
use crate::model::{ExtractedInformation, Report};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete result of analysing one executive summary.
///
/// Serialises with `extracted_info` and `report` as top-level keys, plus
/// per-chunk detail and stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Merged fields, confidences and extraction timestamp.
    pub extracted_info: ExtractedInformation,

    /// The four parsed report sections plus metadata.
    pub report: Report,

    /// Raw report text as returned by the model, before section parsing.
    pub report_text: String,

    /// One entry per chunk sent for extraction, in document order.
    pub chunks: Vec<ChunkOutcome>,

    /// Aggregate statistics.
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    /// Chunks whose extraction reply was merged.
    pub fn succeeded_chunks(&self) -> impl Iterator<Item = &ChunkOutcome> {
        self.chunks.iter().filter(|c| c.error.is_none())
    }
}

/// What happened to one chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkOutcome {
    /// 1-indexed chunk number.
    pub chunk: usize,

    /// Length of the chunk in characters.
    pub chars: usize,

    /// Fields the reply answered with real content. Zero on error.
    pub fields_found: usize,

    /// Why the chunk was dropped, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ChunkError>,

    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// Aggregate statistics for one analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Characters of text extracted from the document.
    pub text_chars: usize,

    /// Chunks the splitter produced, before the `max_chunks` cap.
    pub total_chunks: usize,

    /// Chunks sent for extraction.
    pub processed_chunks: usize,

    /// Chunks dropped because the call or the reply failed.
    pub failed_chunks: usize,

    /// Tokens across every call, the report call included.
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,

    /// Wall-clock time for the whole analysis.
    pub total_duration_ms: u64,

    /// Time spent in PDF text extraction. Zero for [`crate::analyze_text`].
    pub text_duration_ms: u64,

    /// Time spent in extraction calls.
    pub extraction_duration_ms: u64,

    /// Time spent in the report call.
    pub report_duration_ms: u64,
}

/// Paths of the report files written by [`crate::write_reports`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFiles {
    pub html: PathBuf,
    pub markdown: PathBuf,
}
