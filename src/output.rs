//! Output types: pages in, processed document out.
//!
//! Every stage produces a new value; nothing here is mutated after it is
//! built. The data flows strictly one way:
//!
//! ```text
//! RawPage ──▶ DecodeOutcome ──▶ normalised ──▶ cleaned ──▶ PageResult
//!                                                              │
//!                     ProcessedDocument ◀── page-marked concat ┘
//! ```

use crate::error::ModelError;
use crate::pipeline::probe::UNKNOWN_ENCODING;
use serde::{Deserialize, Serialize};

/// One page of extracted text, exactly as the extractor produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// 1-based page number.
    pub page_index: usize,
    /// Bytes handed to the decode chain.
    pub raw_bytes: Vec<u8>,
    /// Best-effort rendering of `raw_bytes` for display.
    pub raw_text: String,
}

impl RawPage {
    /// Build a page from bytes; `raw_text` is their lossy UTF-8 reading.
    pub fn from_bytes(page_index: usize, raw_bytes: Vec<u8>) -> Self {
        let raw_text = String::from_utf8_lossy(&raw_bytes).into_owned();
        Self {
            page_index,
            raw_bytes,
            raw_text,
        }
    }

    /// Build a page from text an extractor already decoded.
    pub fn from_text(page_index: usize, text: impl Into<String>) -> Self {
        let raw_text = text.into();
        Self {
            page_index,
            raw_bytes: raw_text.as_bytes().to_vec(),
            raw_text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw_bytes.is_empty()
    }
}

/// The prober's verdict on a byte buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingGuess {
    pub candidate_name: String,
    /// In `[0, 1]`.
    pub confidence: f32,
}

impl EncodingGuess {
    pub fn new(candidate_name: &str, confidence: f32) -> Self {
        Self {
            candidate_name: candidate_name.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ENCODING, 0.0)
    }
}

/// Which branch of the decode chain produced a page's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeMethod {
    /// Legacy-script repair; `iscii` tells whether the codec re-decode was kept.
    LegacyScript { iscii: bool },
    /// The prober's guess was trusted.
    Probed { encoding: String },
    /// The first fallback encoding whose decode was printable enough.
    Fallback { encoding: String },
    /// Nothing passed; UTF-8 with replacement characters.
    LossyUtf8,
}

impl DecodeMethod {
    /// Short label for logs and progress output.
    pub fn label(&self) -> String {
        match self {
            DecodeMethod::LegacyScript { iscii: true } => "legacy+iscii".to_string(),
            DecodeMethod::LegacyScript { iscii: false } => "legacy".to_string(),
            DecodeMethod::Probed { encoding } => encoding.clone(),
            DecodeMethod::Fallback { encoding } => format!("fallback:{encoding}"),
            DecodeMethod::LossyUtf8 => "utf-8 (lossy)".to_string(),
        }
    }
}

/// Full result of running the decode chain on one buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeOutcome {
    pub text: String,
    pub method: DecodeMethod,
    pub guess: EncodingGuess,
}

/// Result for a single processed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based page number.
    pub page_num: usize,
    pub guess: EncodingGuess,
    pub method: DecodeMethod,
    /// Whether legacy-script markers were found and the repair table applied.
    pub legacy_repaired: bool,
    /// Decoded, normalised and cleaned page text.
    pub text: String,
}

/// Summary counters for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_pages: usize,
    pub processed_pages: usize,
    /// Pages with no extractable text.
    pub skipped_pages: usize,
    pub legacy_pages: usize,
    /// Pages that fell through to lossy UTF-8.
    pub lossy_pages: usize,
    pub total_duration_ms: u64,
}

/// A processed document, ready for the report stages and exporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Every page's raw text under `=== Page <n> Raw ===` headers.
    pub raw_text: String,
    /// Every page's processed text under `=== Page <n> ===` headers.
    pub processed_text: String,
    /// English translation of `processed_text`, when requested. Equal to
    /// `processed_text` if the translation call failed.
    pub translated_text: Option<String>,
    /// Why translation failed, if it did.
    pub translation_error: Option<ModelError>,
    pub pages: Vec<PageResult>,
    pub stats: ProcessingStats,
}

impl ProcessedDocument {
    /// The text downstream consumers should use: the translation when one
    /// exists, the processed text otherwise.
    pub fn final_text(&self) -> &str {
        self.translated_text
            .as_deref()
            .unwrap_or(&self.processed_text)
    }
}

/// Byte-level encoding analysis of one page (see [`crate::process::inspect`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingReport {
    pub page_num: usize,
    pub byte_len: usize,
    pub guess: EncodingGuess,
    /// First bytes as space-separated hex pairs.
    pub hex: String,
    /// First bytes as space-separated 8-bit groups.
    pub binary: String,
    /// First bytes with non-printable ASCII shown as `.`.
    pub ascii: String,
    /// Any of the leading bytes has the high bit set.
    pub high_bit: bool,
    /// All of the leading bytes are below 0x80.
    pub pure_ascii: bool,
    /// Any of the leading bytes is zero (a UTF-16/32 hint).
    pub null_bytes: bool,
    /// Legacy Devanagari markers are present.
    pub legacy_markers: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_page_from_bytes_is_lossy() {
        let page = RawPage::from_bytes(1, vec![b'o', b'k', 0xFF]);
        assert_eq!(page.raw_text, "ok\u{FFFD}");
        assert_eq!(page.raw_bytes.len(), 3);
    }

    #[test]
    fn guess_confidence_is_clamped() {
        assert_eq!(EncodingGuess::new("x", 1.7).confidence, 1.0);
        assert_eq!(EncodingGuess::new("x", -0.2).confidence, 0.0);
    }

    #[test]
    fn final_text_prefers_translation() {
        let mut doc = ProcessedDocument {
            raw_text: String::new(),
            processed_text: "मूल".into(),
            translated_text: None,
            translation_error: None,
            pages: vec![],
            stats: ProcessingStats::default(),
        };
        assert_eq!(doc.final_text(), "मूल");
        doc.translated_text = Some("original".into());
        assert_eq!(doc.final_text(), "original");
    }

    #[test]
    fn decode_method_serialises_with_tag() {
        let json = serde_json::to_string(&DecodeMethod::Fallback {
            encoding: "windows-1252".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"fallback","encoding":"windows-1252"}"#);
    }
}
