//! Document-level entry points.
//!
//! [`process_document`] is the synchronous core: pages in, one
//! [`ProcessedDocument`] out, no I/O. [`process`] wraps it with input
//! resolution, extraction, page selection and the optional translation.
//! [`inspect`] and [`export`] are the two side doors: byte-level analysis
//! without a model, and file output for finished text.

use crate::config::{OutputFormat, PageSelection, ProcessingConfig};
use crate::error::PdfTextError;
use crate::export as exporters;
use crate::output::{
    DecodeMethod, EncodingReport, PageResult, ProcessedDocument, ProcessingStats, RawPage,
};
use crate::pipeline::decode::{decode_with_outcome, text_view};
use crate::pipeline::normalize::{clean_text, normalize_with};
use crate::pipeline::{extract, input, legacy, llm, probe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Bytes shown in the hex, binary and ASCII views of [`EncodingReport`].
pub const INSPECT_PREVIEW_BYTES: usize = 20;
/// Bytes scanned for the pattern flags of [`EncodingReport`].
pub const INSPECT_PATTERN_BYTES: usize = 100;

/// Suffix appended to export names when the content was translated.
pub const TRANSLATED_SUFFIX: &str = "_english";

// ── Pages → document ─────────────────────────────────────────────────────

/// Decode, normalise and clean every page, in input order.
///
/// Pages with no bytes are skipped and counted. Never fails: every page
/// decodes to some string.
pub fn process_document(pages: &[RawPage], config: &ProcessingConfig) -> ProcessedDocument {
    let start = Instant::now();
    let total = pages.len();
    let cb = config.progress_callback.as_ref();

    if let Some(cb) = cb {
        cb.on_document_start(total);
    }

    let mut raw_text = String::new();
    let mut processed_text = String::new();
    let mut results = Vec::with_capacity(total);
    let mut stats = ProcessingStats {
        total_pages: total,
        ..Default::default()
    };

    for page in pages {
        let n = page.page_index;
        if page.is_empty() {
            warn!("Page {} has no extractable text, skipping", n);
            stats.skipped_pages += 1;
            if let Some(cb) = cb {
                cb.on_page_skipped(n, total);
            }
            continue;
        }
        if let Some(cb) = cb {
            cb.on_page_start(n, total);
        }

        let outcome = decode_with_outcome(&page.raw_bytes, config);
        let normalized = normalize_with(&outcome.text, config.paragraph_mode);
        let cleaned = clean_text(&normalized, config.paragraph_mode);

        let legacy_repaired = matches!(outcome.method, DecodeMethod::LegacyScript { .. });
        if legacy_repaired {
            stats.legacy_pages += 1;
        }
        if outcome.method == DecodeMethod::LossyUtf8 {
            stats.lossy_pages += 1;
        }
        stats.processed_pages += 1;

        debug!(
            "Page {}: {} bytes → {} chars via {}",
            n,
            page.raw_bytes.len(),
            cleaned.chars().count(),
            outcome.method.label()
        );
        if let Some(cb) = cb {
            cb.on_page_complete(n, total, cleaned.chars().count(), &outcome.method);
        }

        processed_text.push_str(&format!("\n=== Page {n} ===\n{cleaned}\n"));
        raw_text.push_str(&format!("\n=== Page {n} Raw ===\n{}\n", page.raw_text));

        results.push(PageResult {
            page_num: n,
            guess: outcome.guess,
            method: outcome.method,
            legacy_repaired,
            text: cleaned,
        });
    }

    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    if let Some(cb) = cb {
        cb.on_document_complete(total, stats.processed_pages);
    }

    ProcessedDocument {
        raw_text,
        processed_text,
        translated_text: None,
        translation_error: None,
        pages: results,
        stats,
    }
}

// ── Full pipeline ────────────────────────────────────────────────────────

/// Process a PDF, a `.txt` page dump, or a URL to either.
///
/// # Errors
/// Only fatal errors: unreadable or unsupported input, PDF failures, an
/// empty page selection, or (with `translate`) no resolvable model provider.
/// A failed translation call is not an error; see
/// [`ProcessedDocument::translation_error`].
pub async fn process(
    input_str: impl AsRef<str>,
    config: &ProcessingConfig,
) -> Result<ProcessedDocument, PdfTextError> {
    let start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Processing: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let all_pages = extract::load_pages(resolved.path(), config.password.as_deref()).await?;
    let total = all_pages.len();

    let indices = config.pages.to_indices(total);
    if indices.is_empty() {
        return Err(PdfTextError::PageOutOfRange {
            page: first_requested_page(&config.pages),
            total,
        });
    }
    let selected: Vec<RawPage> = all_pages
        .into_iter()
        .enumerate()
        .filter(|(i, _)| indices.binary_search(i).is_ok())
        .map(|(_, page)| page)
        .collect();
    debug!("Selected {} of {} pages", selected.len(), total);

    let mut doc = process_document(&selected, config);
    doc.stats.total_pages = total;

    if config.translate {
        doc = translate_document(doc, config).await?;
    }

    doc.stats.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Processed {}/{} pages ({} legacy, {} lossy, {} skipped) in {}ms",
        doc.stats.processed_pages,
        total,
        doc.stats.legacy_pages,
        doc.stats.lossy_pages,
        doc.stats.skipped_pages,
        doc.stats.total_duration_ms
    );
    Ok(doc)
}

/// Synchronous wrapper around [`process`]; creates a temporary tokio runtime.
pub fn process_sync(
    input_str: impl AsRef<str>,
    config: &ProcessingConfig,
) -> Result<ProcessedDocument, PdfTextError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfTextError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process(input_str, config))
}

/// Translate `doc.processed_text` with the configured model client.
///
/// Fails only when no client can be resolved. A failed model call leaves
/// `translated_text` equal to the untranslated text and records the error.
pub async fn translate_document(
    doc: ProcessedDocument,
    config: &ProcessingConfig,
) -> Result<ProcessedDocument, PdfTextError> {
    let client = llm::resolve_client(config)?;
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_translation_start();
    }
    info!("Translating {} chars", doc.processed_text.chars().count());

    let outcome = llm::translate(client.as_ref(), &doc.processed_text).await;
    if let Some(cb) = cb {
        cb.on_translation_complete(outcome.error.is_none());
    }
    Ok(ProcessedDocument {
        translated_text: Some(outcome.text),
        translation_error: outcome.error,
        ..doc
    })
}

fn first_requested_page(selection: &PageSelection) -> usize {
    match selection {
        PageSelection::All => 0,
        PageSelection::Single(p) => *p,
        PageSelection::Range(start, _) => *start,
        PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
    }
}

// ── Inspection ───────────────────────────────────────────────────────────

/// Byte-level encoding analysis of every page. No model is involved.
///
/// Uses the download timeout and password from `config`; the decode settings
/// play no part.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ProcessingConfig,
) -> Result<Vec<EncodingReport>, PdfTextError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let pages = extract::load_pages(resolved.path(), config.password.as_deref()).await?;
    Ok(pages.iter().map(encoding_report).collect())
}

/// Analyse one page's bytes.
pub fn encoding_report(page: &RawPage) -> EncodingReport {
    let bytes = &page.raw_bytes;
    let preview = &bytes[..bytes.len().min(INSPECT_PREVIEW_BYTES)];
    let pattern = &bytes[..bytes.len().min(INSPECT_PATTERN_BYTES)];

    let hex = preview
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    let binary = preview
        .iter()
        .map(|b| format!("{b:08b}"))
        .collect::<Vec<_>>()
        .join(" ");
    let ascii = preview
        .iter()
        .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
        .collect();

    EncodingReport {
        page_num: page.page_index,
        byte_len: bytes.len(),
        guess: probe::detect(bytes),
        hex,
        binary,
        ascii,
        high_bit: pattern.iter().any(|&b| b >= 0x80),
        pure_ascii: pattern.iter().all(|&b| b < 0x80),
        null_bytes: pattern.contains(&0),
        legacy_markers: legacy::looks_like_legacy_script(&text_view(bytes)),
    }
}

// ── Export ───────────────────────────────────────────────────────────────

/// Export base name: the input stem, with [`TRANSLATED_SUFFIX`] when the
/// content is a translation.
pub fn export_basename(stem: &str, translated: bool) -> String {
    if translated {
        format!("{stem}{TRANSLATED_SUFFIX}")
    } else {
        stem.to_string()
    }
}

/// Write `content` in the requested formats under `dir`. Returns the written
/// paths, PDF first.
pub async fn export(
    content: &str,
    filename_base: &str,
    dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, PdfTextError> {
    let content = content.to_string();
    let filename_base = filename_base.to_string();
    let dir = dir.to_path_buf();

    tokio::task::spawn_blocking(move || export_blocking(&content, &filename_base, &dir, format))
        .await
        .map_err(|e| PdfTextError::Internal(format!("Export task panicked: {}", e)))?
}

/// Blocking implementation of [`export`].
pub fn export_blocking(
    content: &str,
    filename_base: &str,
    dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, PdfTextError> {
    let mut written = Vec::with_capacity(2);
    if format.wants_pdf() {
        written.push(exporters::pdf::export_pdf(content, filename_base, dir)?);
    }
    if format.wants_html() {
        written.push(exporters::html::export_html(content, filename_base, dir)?);
    }
    Ok(written)
}
