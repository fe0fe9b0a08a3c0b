//! # edgequake-pdftext
//!
//! Recover readable text from PDFs whose text layer is mis-encoded, most
//! notably Devanagari set in legacy fonts that extractors report as Latin-1
//! gibberish (`ºÉ` instead of `सा`).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / .txt page dump / URL
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Extract    per-page text via pdfium (spawn_blocking) or form-feed split
//!  ├─ 3. Decode     legacy repair → prober → fallback encodings → lossy UTF-8
//!  ├─ 4. Normalise  whitespace, artifact fixes, generic cleaner
//!  ├─ 5. Translate  optional, through an injected model client
//!  ├─ 6. Report     optional research → content → format → originality score
//!  └─ 7. Export     sanitised PDF and/or Unicode HTML
//! ```
//!
//! Steps 3 and 4 never fail: every page decodes to *some* string. Only
//! input, PDF and output problems are errors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdftext::{process, ProcessingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessingConfig::default();
//!     let doc = process("scan.pdf", &config).await?;
//!     println!("{}", doc.processed_text);
//!     eprintln!(
//!         "{} pages, {} repaired from legacy fonts",
//!         doc.stats.processed_pages, doc.stats.legacy_pages
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Decoding a single buffer needs no runtime:
//!
//! ```rust
//! use edgequake_pdftext::{decode, ProcessingConfig};
//!
//! let text = decode("ºÉ".as_bytes(), &ProcessingConfig::default());
//! assert_eq!(text, "सा");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdftext` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ```toml
//! edgequake-pdftext = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! PDF extraction and PDF export bind the pdfium shared library at runtime,
//! from `PDFIUM_LIB_PATH` (file or directory) or the system library path.
//! `.txt` page dumps and HTML export work without it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    OutputFormat, PageSelection, ParagraphMode, ProcessingConfig, ProcessingConfigBuilder,
};
pub use error::{DecodeRejection, ModelError, PdfTextError};
pub use output::{
    DecodeMethod, DecodeOutcome, EncodingGuess, EncodingReport, PageResult, ProcessedDocument,
    ProcessingStats, RawPage,
};
pub use pipeline::codec::Codec;
pub use pipeline::decode::{decode, decode_with_outcome};
pub use pipeline::llm::{ModelClient, TranslationOutcome};
pub use pipeline::normalize::{clean_text, normalize};
pub use pipeline::sanitize::sanitize_for_legacy_renderer;
pub use process::{
    export, export_basename, inspect, process, process_document, process_sync,
    translate_document,
};
pub use progress::{NoopProgressCallback, ProcessingProgressCallback, ProgressCallback};
pub use report::{generate_report, OriginalityBand, PlagiarismScore, Report};
