//! Configuration types for text recovery.
//!
//! All processing behaviour is controlled through [`ProcessingConfig`], built
//! via its [`ProcessingConfigBuilder`]. The decode-chain thresholds and the
//! fallback order live here so tests can tighten or reorder them without
//! touching the pipeline code.

use crate::error::PdfTextError;
use crate::pipeline::codec::{default_fallback_codecs, Codec};
use crate::pipeline::llm::ModelClient;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Upper bound accepted for [`ProcessingConfig::max_retries`].
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Configuration for processing one document.
///
/// Built via [`ProcessingConfig::builder()`] or using
/// [`ProcessingConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdftext::{ParagraphMode, ProcessingConfig};
///
/// let config = ProcessingConfig::builder()
///     .printable_threshold(0.9)
///     .paragraph_mode(ParagraphMode::Preserve)
///     .fallback_labels(&["utf-8", "cp1252"])
///     .unwrap()
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ProcessingConfig {
    /// Candidate encodings tried in order once the prober is not trusted.
    /// Default: utf-8, utf-16, utf-32, iso-8859-1, cp1252, ascii, latin1,
    /// latin_1, iso-8859-15, windows-1252, mac_roman.
    ///
    /// The first candidate whose decode is printable enough wins, so the
    /// order decides the result for byte strings valid under several codecs.
    pub fallback_encodings: Vec<Codec>,

    /// A fallback decode is accepted when its printable ratio is strictly
    /// above this. Range 0–1. Default: 0.8.
    pub printable_threshold: f32,

    /// The prober's guess is trusted when its confidence is strictly above
    /// this. Range 0–1. Default: 0.8.
    pub confidence_threshold: f32,

    /// The ISCII re-decode after legacy repair is kept when its printable
    /// ratio is strictly above this. Range 0–1. Default: 0.8.
    pub legacy_acceptance_threshold: f32,

    /// Re-decode repaired legacy text with the ISCII-91 codec. Default: true.
    pub iscii_redecode: bool,

    /// Probe only the first N bytes of each page. Default: None (whole page).
    pub probe_sample_bytes: Option<usize>,

    /// Whitespace policy of the normaliser. Default: [`ParagraphMode::Flatten`].
    pub paragraph_mode: ParagraphMode,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Translate the processed text to English. Default: false.
    pub translate: bool,

    /// Model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-nano".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "gemini", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed model client. Takes precedence over `provider_name`.
    pub client: Option<Arc<dyn ModelClient>>,

    /// Sampling temperature for model calls. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens a model call may generate. Default: 8192.
    ///
    /// A translation is roughly as long as its input, so this caps the size
    /// of document that translates in one call.
    pub max_tokens: usize,

    /// Maximum retry attempts on a failed model call. Default: 3, at most
    /// [`MAX_RETRIES_LIMIT`].
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per model call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            fallback_encodings: default_fallback_codecs(),
            printable_threshold: 0.8,
            confidence_threshold: 0.8,
            legacy_acceptance_threshold: 0.8,
            iscii_redecode: true,
            probe_sample_bytes: None,
            paragraph_mode: ParagraphMode::default(),
            pages: PageSelection::default(),
            password: None,
            translate: false,
            model: None,
            provider_name: None,
            client: None,
            temperature: 0.1,
            max_tokens: 8192,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 120,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fallback: Vec<&str> = self.fallback_encodings.iter().map(Codec::name).collect();
        f.debug_struct("ProcessingConfig")
            .field("fallback_encodings", &fallback)
            .field("printable_threshold", &self.printable_threshold)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("legacy_acceptance_threshold", &self.legacy_acceptance_threshold)
            .field("iscii_redecode", &self.iscii_redecode)
            .field("probe_sample_bytes", &self.probe_sample_bytes)
            .field("paragraph_mode", &self.paragraph_mode)
            .field("pages", &self.pages)
            .field("translate", &self.translate)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("client", &self.client.as_ref().map(|_| "<dyn ModelClient>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ProcessingConfig {
    /// Create a new builder for `ProcessingConfig`.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ProcessingConfig`].
#[derive(Debug)]
pub struct ProcessingConfigBuilder {
    config: ProcessingConfig,
}

impl ProcessingConfigBuilder {
    pub fn fallback_encodings(mut self, codecs: Vec<Codec>) -> Self {
        self.config.fallback_encodings = codecs;
        self
    }

    /// Set the fallback order from encoding labels such as `"cp1252"`.
    ///
    /// Fails on the first label no codec answers to.
    pub fn fallback_labels(mut self, labels: &[&str]) -> Result<Self, PdfTextError> {
        let codecs = labels
            .iter()
            .map(|label| {
                Codec::for_label(label).ok_or_else(|| {
                    PdfTextError::InvalidConfig(format!("Unknown encoding label '{label}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.config.fallback_encodings = codecs;
        Ok(self)
    }

    pub fn printable_threshold(mut self, t: f32) -> Self {
        self.config.printable_threshold = t;
        self
    }

    pub fn confidence_threshold(mut self, t: f32) -> Self {
        self.config.confidence_threshold = t;
        self
    }

    pub fn legacy_acceptance_threshold(mut self, t: f32) -> Self {
        self.config.legacy_acceptance_threshold = t;
        self
    }

    pub fn iscii_redecode(mut self, v: bool) -> Self {
        self.config.iscii_redecode = v;
        self
    }

    pub fn probe_sample_bytes(mut self, n: usize) -> Self {
        self.config.probe_sample_bytes = Some(n.max(1));
        self
    }

    pub fn paragraph_mode(mut self, mode: ParagraphMode) -> Self {
        self.config.paragraph_mode = mode;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn translate(mut self, v: bool) -> Self {
        self.config.translate = v;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessingConfig, PdfTextError> {
        let c = &self.config;
        for (name, value) in [
            ("printable_threshold", c.printable_threshold),
            ("confidence_threshold", c.confidence_threshold),
            ("legacy_acceptance_threshold", c.legacy_acceptance_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PdfTextError::InvalidConfig(format!(
                    "{name} must be within 0–1, got {value}"
                )));
            }
        }
        if c.max_retries > MAX_RETRIES_LIMIT {
            return Err(PdfTextError::InvalidConfig(format!(
                "max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                c.max_retries
            )));
        }
        if c.fallback_encodings.is_empty() {
            return Err(PdfTextError::InvalidConfig(
                "Fallback encoding list must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What the normaliser does with line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParagraphMode {
    /// Every whitespace run, newlines included, becomes one space. (default)
    ///
    /// Lossy: paragraph structure is gone. Downstream consumers have always
    /// received the flattened form.
    #[default]
    Flatten,
    /// Horizontal whitespace collapses, lines are trimmed and blank-line runs
    /// become exactly one blank line.
    Preserve,
}

/// Specifies which pages of the document to process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// All pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let in_range = |p: usize| p >= 1 && p <= total_pages;
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => in_range(*p).then(|| p - 1).into_iter().collect(),
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| in_range(p))
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// Which files [`crate::process::export`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Plain-text PDF through the 8-bit renderer (sanitised).
    Pdf,
    /// Unicode HTML from the markdown renderer.
    Html,
    /// Both files. (default)
    #[default]
    Both,
}

impl OutputFormat {
    pub fn wants_pdf(self) -> bool {
        matches!(self, OutputFormat::Pdf | OutputFormat::Both)
    }

    pub fn wants_html(self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::Both)
    }
}
