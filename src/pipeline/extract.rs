//! Page extraction: one [`RawPage`] per page of the input file.
//!
//! Two input kinds are understood:
//!
//! * **PDF** (`%PDF` magic): pdfium reads each page's text layer. The text
//!   pdfium returns is already Unicode, so a page's bytes are the UTF-8
//!   encoding of that text. Mis-decoded legacy fonts still show up as the
//!   Latin-1 marker characters and are repaired downstream.
//! * **Raw page dump** (`.txt`): bytes split on form feed (`0x0C`), one page
//!   per segment, passed on untouched so legacy encodings reach the decode
//!   chain intact.
//!
//! pdfium is not async-safe, so PDF work runs in `spawn_blocking`.

use crate::error::PdfTextError;
use crate::output::RawPage;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const FORM_FEED: u8 = 0x0C;

/// Environment variable naming the pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium: `PDFIUM_LIB_PATH` when set, otherwise the system library.
pub fn bind_pdfium() -> Result<Pdfium, PdfTextError> {
    let bindings = match std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        Some(configured) => {
            let configured = Path::new(&configured);
            let lib = if configured.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(configured)
            } else {
                configured.to_path_buf()
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PdfTextError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Load every page of the file at `path`.
pub async fn load_pages(
    path: &Path,
    password: Option<&str>,
) -> Result<Vec<RawPage>, PdfTextError> {
    let path = path.to_path_buf();
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || load_pages_blocking(&path, password.as_deref()))
        .await
        .map_err(|e| PdfTextError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of [`load_pages`].
pub fn load_pages_blocking(
    path: &Path,
    password: Option<&str>,
) -> Result<Vec<RawPage>, PdfTextError> {
    let magic = read_magic(path)?;
    if &magic == b"%PDF" {
        return extract_pdf(path, password);
    }
    let is_dump = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if is_dump {
        let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
        let pages = split_page_dump(&bytes);
        info!("Page dump loaded: {} pages", pages.len());
        return Ok(pages);
    }
    Err(PdfTextError::UnsupportedInput {
        path: path.to_path_buf(),
        magic,
    })
}

/// Split a raw dump on form feeds. A single trailing form feed does not
/// start an extra page.
pub fn split_page_dump(bytes: &[u8]) -> Vec<RawPage> {
    let body = bytes.strip_suffix(&[FORM_FEED]).unwrap_or(bytes);
    body.split(|&b| b == FORM_FEED)
        .enumerate()
        .map(|(i, chunk)| RawPage::from_bytes(i + 1, chunk.to_vec()))
        .collect()
}

fn read_magic(path: &Path) -> Result<[u8; 4], PdfTextError> {
    let mut file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => return Err(io_error(path, e)),
        }
    }
    Ok(magic)
}

fn io_error(path: &Path, e: std::io::Error) -> PdfTextError {
    match e.kind() {
        std::io::ErrorKind::NotFound => PdfTextError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => PdfTextError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfTextError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    }
}

fn extract_pdf(path: &Path, password: Option<&str>) -> Result<Vec<RawPage>, PdfTextError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                PdfTextError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                PdfTextError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            PdfTextError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut results = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| PdfTextError::ExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Extracted page {} ({} chars)", idx + 1, text.chars().count());
        results.push(RawPage::from_text(idx + 1, text));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_splits_on_form_feed() {
        let pages = split_page_dump(b"one\x0ctwo\x0c\x0cfour");
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].raw_bytes, b"one");
        assert_eq!(pages[1].page_index, 2);
        assert!(pages[2].is_empty());
        assert_eq!(pages[3].raw_text, "four");
    }

    #[test]
    fn trailing_form_feed_adds_no_page() {
        assert_eq!(split_page_dump(b"a\x0cb\x0c").len(), 2);
    }

    #[test]
    fn dump_bytes_are_untouched() {
        let pages = split_page_dump(&[0xBA, 0xC9, 0x0C, 0xFF]);
        assert_eq!(pages[0].raw_bytes, vec![0xBA, 0xC9]);
        assert_eq!(pages[1].raw_bytes, vec![0xFF]);
    }

    #[test]
    fn txt_file_loads_without_pdfium() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.TXT");
        std::fs::write(&path, b"first\x0csecond").unwrap();
        let pages = load_pages_blocking(&path, None).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].raw_text, "second");
    }

    #[test]
    fn unknown_file_kind_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, b"\x89PNG....").unwrap();
        match load_pages_blocking(&path, None) {
            Err(PdfTextError::UnsupportedInput { magic, .. }) => assert_eq!(&magic, b"\x89PNG"),
            other => panic!("expected UnsupportedInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = load_pages(Path::new("/no/such/file.txt"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfTextError::FileNotFound { .. }));
    }
}
