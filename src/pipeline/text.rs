//! PDF text extraction.
//!
//! pdfium is tried first because it copes best with multi-column layouts.
//! When the pdfium library cannot be bound, cannot open the file, or yields
//! no text at all, the pure-Rust `pdf-extract` engine gets a second attempt.
//! Password errors are not retried with the fallback: it cannot decrypt
//! either, and the user needs to hear about the password.
//!
//! Both engines are blocking, so extraction runs on `spawn_blocking`.

use crate::error::AnalyzerError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extract all text from a PDF, trimmed. May be empty for image-only PDFs.
pub async fn extract_text(pdf_path: &Path, password: Option<&str>) -> Result<String, AnalyzerError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_text_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| AnalyzerError::Internal(format!("Text extraction task panicked: {}", e)))?
}

/// Why the primary engine did not produce text.
enum PdfiumFailure {
    /// Password problems are final.
    Fatal(AnalyzerError),
    /// Anything else is worth a fallback attempt.
    Recoverable(String),
}

fn extract_text_blocking(pdf_path: &Path, password: Option<&str>) -> Result<String, AnalyzerError> {
    let pdfium_err = match extract_with_pdfium(pdf_path, password) {
        Ok(text) if !text.trim().is_empty() => {
            info!("Extracted {} chars with pdfium", text.len());
            return Ok(text.trim().to_string());
        }
        Ok(_) => "pdfium returned no text".to_string(),
        Err(PdfiumFailure::Fatal(e)) => return Err(e),
        Err(PdfiumFailure::Recoverable(detail)) => detail,
    };
    warn!("pdfium extraction failed ({}); falling back to pdf-extract", pdfium_err);

    let bytes = std::fs::read(pdf_path).map_err(|e| AnalyzerError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: format!("pdfium: {pdfium_err}; read: {e}"),
    })?;
    match pdf_extract::extract_text_from_mem(&bytes) {
        Ok(text) => {
            info!("Extracted {} chars with pdf-extract", text.len());
            Ok(text.trim().to_string())
        }
        Err(e) => Err(AnalyzerError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("pdfium: {pdfium_err}; pdf-extract: {e}"),
        }),
    }
}

/// Bind pdfium from `PDFIUM_LIB_PATH` when set, else from the system.
fn bind_pdfium() -> Result<Pdfium, PdfiumError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path)?,
        _ => Pdfium::bind_to_system_library()?,
    };
    Ok(Pdfium::new(bindings))
}

fn extract_with_pdfium(pdf_path: &Path, password: Option<&str>) -> Result<String, PdfiumFailure> {
    let pdfium = bind_pdfium().map_err(|e| PdfiumFailure::Recoverable(format!("bind: {e:?}")))?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            PdfiumFailure::Fatal(if password.is_some() {
                AnalyzerError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                AnalyzerError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            })
        } else {
            PdfiumFailure::Recoverable(err_str)
        }
    })?;

    let mut text = String::new();
    for (idx, page) in document.pages().iter().enumerate() {
        match page.text() {
            Ok(page_text) => {
                let t = page_text.all();
                debug!("Page {}: {} chars", idx + 1, t.len());
                if !t.is_empty() {
                    text.push_str(&t);
                    text.push('\n');
                }
            }
            Err(e) => warn!("Page {}: text extraction failed: {:?}", idx + 1, e),
        }
    }
    Ok(text)
}
