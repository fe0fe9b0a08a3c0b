//! Input resolution: turn a user-supplied path or URL into a local file.
//!
//! pdfium opens documents by path, so URLs are downloaded into a `TempDir`
//! that lives as long as the returned [`ResolvedInput`]. Whether the file is
//! a PDF or a raw page dump is decided later by [`crate::pipeline::extract`].

use crate::error::PdfTextError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input: either a local path or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL. The `TempDir` is kept alive until processing completes.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    /// File name without extension, used to name exported files.
    pub fn stem(&self) -> String {
        self.path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a readable local file.
///
/// URLs are downloaded with `timeout_secs` as the whole-request timeout.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, PdfTextError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else if input.trim().is_empty() {
        Err(PdfTextError::InvalidInput {
            input: input.to_string(),
        })
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, PdfTextError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(PdfTextError::FileNotFound { path });
    }

    if let Err(e) = std::fs::File::open(&path) {
        return Err(match e.kind() {
            std::io::ErrorKind::PermissionDenied => PdfTextError::PermissionDenied { path },
            _ => PdfTextError::FileNotFound { path },
        });
    }

    debug!("Resolved local input: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, PdfTextError> {
    info!("Downloading document from: {}", url);

    let failed = |reason: String| PdfTextError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PdfTextError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let is_text = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/plain"));
    let filename = filename_from_url(url, is_text);

    let temp_dir = TempDir::new().map_err(|e| PdfTextError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            PdfTextError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| PdfTextError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment when it has an extension, otherwise a default
/// name whose extension matches the content type.
fn filename_from_url(url: &str, is_text: bool) -> String {
    let from_path = reqwest::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });
    match from_path {
        Some(last) if !last.is_empty() && last.contains('.') => last,
        _ if is_text => "downloaded.txt".to_string(),
        _ => "downloaded.pdf".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_uses_last_segment_with_extension() {
        assert_eq!(
            filename_from_url("https://example.com/papers/report.pdf?x=1", false),
            "report.pdf"
        );
        assert_eq!(filename_from_url("https://example.com/papers/", false), "downloaded.pdf");
        assert_eq!(filename_from_url("https://example.com/dump", true), "downloaded.txt");
    }

    #[tokio::test]
    async fn missing_local_file_is_reported() {
        let err = resolve_input("/definitely/not/here.pdf", 5).await.err().unwrap();
        assert!(matches!(err, PdfTextError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let err = resolve_input("  ", 5).await.err().unwrap();
        assert!(matches!(err, PdfTextError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn local_file_resolves_with_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan-01.txt");
        std::fs::write(&path, b"page").unwrap();
        let resolved = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(resolved.path(), path.as_path());
        assert_eq!(resolved.stem(), "scan-01");
    }
}
