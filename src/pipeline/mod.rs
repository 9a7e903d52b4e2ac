//! Pipeline stages for executive-summary analysis.
//!
//! Each submodule implements one step. The orchestration lives in
//! [`crate::analyze`]; nothing here knows about the others except through
//! the types in [`crate::model`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text ──▶ chunk ──▶ llm ──▶ response ──▶ (merge) ──▶ llm ──▶ (sections) ──▶ render
//! (path/URL) (pdfium)  (split)  (extract) (JSON)               (report)               (md/html)
//! ```
//!
//! 1. [`input`]   : canonicalise the user-supplied path or URL to a local PDF
//! 2. [`text`]    : pull the text layer; runs in `spawn_blocking`
//! 3. [`chunk`]   : recursive character splitting with overlap
//! 4. [`llm`]     : the [`llm::ChatBackend`] seam; the only stage with
//!    network I/O
//! 5. [`response`]: turn an extraction reply into an
//!    [`crate::model::ExtractionResult`]
//! 6. [`render`]  : Markdown and HTML reports

pub mod chunk;
pub mod input;
pub mod llm;
pub mod render;
pub mod response;
pub mod text;
