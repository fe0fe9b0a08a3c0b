//! Exporters: final text to PDF and HTML files.
//!
//! * [`pdf`] — plain-text PDF through pdfium's built-in Helvetica. That font
//!   is 8-bit, so the content is run through
//!   [`crate::pipeline::sanitize::sanitize_for_legacy_renderer`] first.
//! * [`html`] — Markdown rendered to a standalone, full-Unicode HTML page.
//!
//! Both write atomically: the bytes go to a `.tmp` sibling first, then the
//! file is renamed into place, so a reader never sees a half-written export.

pub mod html;
pub mod pdf;

use crate::error::PdfTextError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `<dir>/<filename_base>.<ext>`
pub(crate) fn export_path(dir: &Path, filename_base: &str, ext: &str) -> PathBuf {
    dir.join(format!("{filename_base}.{ext}"))
}

/// Write `bytes` to `path` via a temporary sibling and a rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PdfTextError> {
    let write_err = |source: std::io::Error| PdfTextError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let written = std::fs::write(&tmp_path, bytes).and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_path(&dir.path().join("nested"), "paper_english", "html");
        write_atomic(&path, b"<html></html>").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"<html></html>");
        assert!(path.ends_with("nested/paper_english.html"));
        assert!(!dir.path().join("nested/paper_english.html.tmp").exists());
    }

    #[test]
    fn failed_rename_removes_tmp() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the file should go makes the rename fail
        let path = dir.path().join("report.html");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let err = write_atomic(&path, b"<html></html>").unwrap_err();
        assert!(matches!(err, PdfTextError::OutputWriteFailed { .. }));
        assert!(!dir.path().join("report.html.tmp").exists());
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }
}
