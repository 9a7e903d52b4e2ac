//! Input resolution: normalise a user-supplied path or URL to a local PDF.
//!
//! Both text engines read from the file system, so URL inputs are
//! downloaded into a `TempDir` that lives as long as the returned
//! [`ResolvedInput`]. Every input is checked for the `%PDF` magic bytes and
//! the configured size limit before any extraction work starts.

use crate::error::AnalyzerError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// File extensions accepted by [`allowed_file`].
const ALLOWED_EXTENSIONS: [&str; 1] = ["pdf"];

/// The resolved input: either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL. The `TempDir` is removed when this value is dropped.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// True when `filename` has an extension (case-insensitive) that may be
/// uploaded for analysis.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}

/// Resolve the input string to a local PDF file path.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
    max_bytes: u64,
) -> Result<ResolvedInput, AnalyzerError> {
    if input.trim().is_empty() {
        return Err(AnalyzerError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs, max_bytes).await
    } else {
        resolve_local(input, max_bytes)
    }
}

fn resolve_local(path_str: &str, max_bytes: u64) -> Result<ResolvedInput, AnalyzerError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(AnalyzerError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(AnalyzerError::PermissionDenied { path });
        }
        Err(_) => return Err(AnalyzerError::FileNotFound { path }),
    };

    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    if size > max_bytes {
        return Err(AnalyzerError::FileTooLarge {
            path,
            size,
            limit: max_bytes,
        });
    }

    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => check_magic(&path, &magic)?,
        // Shorter than four bytes: not a PDF either.
        Err(_) => return Err(AnalyzerError::NotAPdf { path, magic }),
    }

    debug!("Resolved local PDF: {} ({} bytes)", path.display(), size);
    Ok(ResolvedInput::Local(path))
}

/// Reject anything that does not start with `%PDF`.
pub(crate) fn check_magic(path: &Path, bytes: &[u8]) -> Result<(), AnalyzerError> {
    if bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(AnalyzerError::NotAPdf {
        path: path.to_path_buf(),
        magic,
    })
}

async fn download_url(
    url: &str,
    timeout_secs: u64,
    max_bytes: u64,
) -> Result<ResolvedInput, AnalyzerError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let download_err = |e: reqwest::Error| {
        if e.is_timeout() {
            AnalyzerError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AnalyzerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(download_err)?;

    if !response.status().is_success() {
        return Err(AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);
    let temp_dir = TempDir::new().map_err(|e| AnalyzerError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(AnalyzerError::FileTooLarge {
                path: file_path,
                size: len,
                limit: max_bytes,
            });
        }
    }

    let bytes = response.bytes().await.map_err(download_err)?;
    if bytes.len() as u64 > max_bytes {
        return Err(AnalyzerError::FileTooLarge {
            path: file_path,
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }
    check_magic(&file_path, &bytes)?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| AnalyzerError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of the URL when it looks like a file name.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty() && last.contains('.'))
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIMIT: u64 = 16 * 1024 * 1024;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("summary.pdf"));
        assert!(allowed_file("Summary.PDF"));
        assert!(allowed_file("a.b.pdf"));
        assert!(!allowed_file("summary.docx"));
        assert!(!allowed_file("pdf"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(filename_from_url("https://x.io/files/deck.pdf"), "deck.pdf");
        assert_eq!(filename_from_url("https://x.io/files/"), "downloaded.pdf");
        assert_eq!(filename_from_url("https://x.io/download"), "downloaded.pdf");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/here.pdf", 5, LIMIT)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let err = resolve_input("  ", 5, LIMIT).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn non_pdf_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"PK\x03\x04 zip archive").unwrap();
        let err = resolve_input(tmp.path().to_str().unwrap(), 5, LIMIT)
            .await
            .unwrap_err();
        match err {
            AnalyzerError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n").unwrap();
        tmp.write_all(&[b' '; 64]).unwrap();
        let err = resolve_input(tmp.path().to_str().unwrap(), 5, 16)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::FileTooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn pdf_magic_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.4\n%%EOF").unwrap();
        let resolved = resolve_input(tmp.path().to_str().unwrap(), 5, LIMIT)
            .await
            .unwrap();
        assert_eq!(resolved.path(), tmp.path());
    }
}
