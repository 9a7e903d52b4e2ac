//! Error types for the exec-summary-analyzer library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AnalyzerError`] (**fatal**): the analysis cannot produce a report
//!   (unreadable input, no text in the PDF, provider not configured, or the
//!   report-generation call failed). Returned as `Err(AnalyzerError)` from
//!   every `analyze*` entry point.
//!
//! * [`ChunkError`] (**non-fatal**): one text chunk could not be turned into
//!   an extraction result (the call failed or the reply was not usable JSON).
//!   The chunk is dropped and extraction continues with the others; the error
//!   is kept in [`crate::output::ChunkOutcome`] for inspection.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the exec-summary-analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// An uploaded file name does not carry an allowed extension.
    #[error("Invalid file type '{filename}'. Only PDF files are allowed.")]
    DisallowedFileType { filename: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The input exceeds the configured size limit.
    #[error("File '{path}' is {size} bytes, larger than the {limit}-byte limit")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Neither text engine could read the document.
    #[error("PDF '{path}' could not be read: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The PDF opened but contains no extractable text (e.g. a scan).
    #[error("Unable to extract text from PDF '{path}'")]
    NoExtractableText { path: PathBuf },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a report file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single text chunk.
///
/// Chunk numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum ChunkError {
    /// The extraction call itself failed.
    #[error("Chunk {chunk}: LLM call failed: {detail}")]
    LlmFailed { chunk: usize, detail: String },

    /// The reply could not be parsed as JSON.
    #[error("Chunk {chunk}: reply is not valid JSON: {detail}")]
    InvalidJson { chunk: usize, detail: String },

    /// The reply parsed, but is not a JSON object.
    #[error("Chunk {chunk}: reply JSON is not an object (got {kind})")]
    NotAnObject { chunk: usize, kind: String },
}

impl ChunkError {
    pub fn chunk(&self) -> usize {
        match self {
            ChunkError::LlmFailed { chunk, .. }
            | ChunkError::InvalidJson { chunk, .. }
            | ChunkError::NotAnObject { chunk, .. } => *chunk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_display() {
        let e = AnalyzerError::FileTooLarge {
            path: "big.pdf".into(),
            size: 20_000_000,
            limit: 16_777_216,
        };
        let msg = e.to_string();
        assert!(msg.contains("big.pdf"), "got: {msg}");
        assert!(msg.contains("16777216"), "got: {msg}");
    }

    #[test]
    fn disallowed_file_type_display() {
        let e = AnalyzerError::DisallowedFileType {
            filename: "summary.docx".into(),
        };
        assert!(e.to_string().contains("Only PDF files"));
    }

    #[test]
    fn llm_api_error_display() {
        let e = AnalyzerError::LlmApiError {
            message: "401 invalid key".into(),
        };
        assert!(e.to_string().contains("401 invalid key"));
    }

    #[test]
    fn chunk_error_reports_chunk_number() {
        let e = ChunkError::InvalidJson {
            chunk: 2,
            detail: "expected value at line 1".into(),
        };
        assert_eq!(e.chunk(), 2);
        assert!(e.to_string().starts_with("Chunk 2:"));
    }

    #[test]
    fn chunk_error_serialises() {
        let e = ChunkError::NotAnObject {
            chunk: 1,
            kind: "array".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("NotAnObject"));
    }
}
