//! Error types for the edgequake-pdftext library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`PdfTextError`] — **Fatal**: the document cannot be processed at all
//!   (bad input file, wrong password, pdfium missing, exporter could not
//!   write). Returned as `Err(PdfTextError)` from the top-level functions.
//!
//! * [`ModelError`] — **Non-fatal**: a model call (translation, report
//!   stage) failed. Translation keeps the untranslated text as a usable
//!   fallback and stores the error next to it in
//!   [`crate::output::ProcessedDocument`].
//!
//! * [`DecodeRejection`] — **Internal**: a single candidate encoding could
//!   not decode a page, or decoded it into mostly unprintable text. The decode
//!   chain logs it and moves to the next candidate; it is never returned.
//!   Decoding always produces *some* string.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdftext library.
#[derive(Debug, Error)]
pub enum PdfTextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file is neither a PDF nor a `.txt` raw page dump.
    #[error("Unsupported input '{path}': expected a PDF or a .txt page dump\nFirst bytes: {magic:?}")]
    UnsupportedInput { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The page selection matched no page of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium could not extract the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory) or install\n\
pdfium system-wide so it can be found on the library search path.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A model call failed where no fallback exists (report generation).
    #[error("Model call failed during {stage}: {source}")]
    Model {
        stage: String,
        #[source]
        source: ModelError,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF exporter failed inside pdfium.
    #[error("Failed to export '{path}': {detail}")]
    ExportFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal model-call failure.
///
/// The caller's own timeout policy is applied by
/// [`crate::pipeline::llm::ProviderClient`]; this type records what went
/// wrong so it can be reported next to the fallback text.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum ModelError {
    /// The call did not complete within the configured timeout.
    #[error("model call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The provider returned an error on every attempt.
    #[error("model call failed after {retries} retries: {detail}")]
    RequestFailed { retries: u32, detail: String },

    /// The provider answered, but the answer could not be used.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

/// Why a candidate encoding was skipped by the decode chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeRejection {
    /// The bytes are malformed for this encoding.
    #[error("{encoding}: cannot decode input")]
    DecodeFailure { encoding: String },

    /// Decoding succeeded but too few characters are printable.
    #[error("{encoding}: printable ratio {ratio:.2} not above {threshold:.2}")]
    LowPrintableRatio {
        encoding: String,
        ratio: f32,
        threshold: f32,
    },
}
