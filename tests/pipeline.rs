//! Integration tests for the text-recovery pipeline.
//!
//! Everything here runs offline: models are canned `ModelClient`s and inputs
//! are raw `.txt` page dumps, so neither network access nor pdfium is needed.

use async_trait::async_trait;
use edgequake_pdftext::prompts::{FORMAT_INSTRUCTIONS, PLAGIARISM_RUBRIC, RESEARCH_INSTRUCTIONS};
use edgequake_pdftext::{
    export, generate_report, process, process_document, DecodeMethod, ModelClient, ModelError,
    OriginalityBand, OutputFormat, PageSelection, ParagraphMode, PdfTextError, ProcessingConfig,
    ProcessingProgressCallback, RawPage,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────

/// Answers by stage, recognised from the system prompt.
struct StagedClient {
    calls: Mutex<Vec<String>>,
}

impl StagedClient {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    fn stages(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for StagedClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let (stage, reply) = if system == RESEARCH_INSTRUCTIONS {
            ("research", format!("Title: Findings\n{user}"))
        } else if system.starts_with("Using ONLY") {
            ("content", "Findings\n\nThe body.".to_string())
        } else if system == FORMAT_INSTRUCTIONS {
            (
                "format",
                "```markdown\r\n# Findings\r\nThe body.   \r\n\r\n\r\n\r\nEnd.\r\n```".to_string(),
            )
        } else if system == PLAGIARISM_RUBRIC {
            (
                "score",
                r#"Sure: {"criteria":[{"name":"Content Structure","score":17}],"total":91,"analysis":"fresh"}"#
                    .to_string(),
            )
        } else {
            ("translate", "Hello world".to_string())
        };
        self.calls.lock().unwrap().push(stage.to_string());
        Ok(reply)
    }
}

/// Every call fails.
struct DownClient;

#[async_trait]
impl ModelClient for DownClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ModelError> {
        Err(ModelError::RequestFailed {
            retries: 3,
            detail: "503 service unavailable".into(),
        })
    }
}

#[derive(Default)]
struct Counter {
    completed: AtomicUsize,
    skipped: AtomicUsize,
    translation_ok: Mutex<Option<bool>>,
}

impl ProcessingProgressCallback for Counter {
    fn on_page_complete(&self, _page: usize, _total: usize, _chars: usize, _m: &DecodeMethod) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_page_skipped(&self, _page: usize, _total: usize) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }
    fn on_translation_complete(&self, ok: bool) {
        *self.translation_ok.lock().unwrap() = Some(ok);
    }
}

fn write_dump(dir: &tempfile::TempDir, name: &str, pages: &[&[u8]]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, pages.join(&b'\x0c')).unwrap();
    path
}

// ── process_document ─────────────────────────────────────────────────────

#[test]
fn mixed_document_uses_each_decode_branch() {
    let pages = vec![
        RawPage::from_bytes(1, b"Plain  ASCII   page.".to_vec()),
        RawPage::from_bytes(2, "ºÉ".as_bytes().to_vec()),
        RawPage::from_bytes(3, b"caf\xe9 cr\xe8me".to_vec()),
        RawPage::from_bytes(4, Vec::new()),
    ];
    let doc = process_document(&pages, &ProcessingConfig::default());

    assert_eq!(doc.pages.len(), 3);
    assert_eq!(doc.pages[0].text, "Plain ASCII page.");
    assert!(matches!(doc.pages[0].method, DecodeMethod::Probed { .. }));
    assert_eq!(doc.pages[1].text, "सा");
    assert!(doc.pages[1].legacy_repaired);
    assert_eq!(doc.pages[2].text, "café crème");
    assert_eq!(doc.stats.skipped_pages, 1);
    assert_eq!(doc.stats.legacy_pages, 1);
    assert!(doc.processed_text.contains("\n=== Page 2 ===\nसा\n"));
    assert!(doc.raw_text.contains("\n=== Page 2 Raw ===\nºÉ\n"));
}

#[test]
fn callbacks_see_every_page() {
    let counter = Arc::new(Counter::default());
    let config = ProcessingConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();
    let pages = vec![
        RawPage::from_bytes(1, b"a".to_vec()),
        RawPage::from_bytes(2, Vec::new()),
        RawPage::from_bytes(3, b"c".to_vec()),
    ];
    process_document(&pages, &config);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
    assert_eq!(counter.skipped.load(Ordering::SeqCst), 1);
}

#[test]
fn processing_is_deterministic() {
    let pages = vec![RawPage::from_bytes(1, vec![0xBA, 0xC9, 0xCC, b' ', 0xFF, 0x80])];
    let config = ProcessingConfig::default();
    let a = process_document(&pages, &config);
    let b = process_document(&pages, &config);
    assert_eq!(a.processed_text, b.processed_text);
}

// ── process (raw page dumps) ─────────────────────────────────────────────

#[tokio::test]
async fn dump_file_is_processed_page_by_page() {
    let dir = tempfile::tempdir().unwrap();
    let pages: [&[u8]; 3] = [b"first   page", &[0xBA, 0xC9, 0xCC], b"third"];
    let path = write_dump(&dir, "scan.txt", &pages);
    let config = ProcessingConfig::builder()
        .pages(PageSelection::Range(2, 3))
        .paragraph_mode(ParagraphMode::Preserve)
        .build()
        .unwrap();

    let doc = process(path.to_str().unwrap(), &config).await.unwrap();
    assert_eq!(doc.stats.total_pages, 3);
    assert_eq!(doc.stats.processed_pages, 2);
    assert_eq!(doc.pages[0].page_num, 2);
    assert_eq!(doc.pages[0].text, "साम");
    assert_eq!(doc.pages[1].text, "third");
    assert!(doc.translated_text.is_none());
}

#[tokio::test]
async fn translation_success_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dump(&dir, "hindi.txt", &["नमस्ते दुनिया".as_bytes()]);
    let counter = Arc::new(Counter::default());
    let config = ProcessingConfig::builder()
        .translate(true)
        .client(StagedClient::new())
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let doc = process(path.to_str().unwrap(), &config).await.unwrap();
    assert_eq!(doc.translated_text.as_deref(), Some("Hello world"));
    assert!(doc.translation_error.is_none());
    assert_eq!(doc.final_text(), "Hello world");
    assert_eq!(*counter.translation_ok.lock().unwrap(), Some(true));
}

#[tokio::test]
async fn translation_failure_keeps_processed_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dump(&dir, "hindi.txt", &["नमस्ते".as_bytes()]);
    let config = ProcessingConfig::builder()
        .translate(true)
        .client(Arc::new(DownClient))
        .build()
        .unwrap();

    let doc = process(path.to_str().unwrap(), &config).await.unwrap();
    assert_eq!(doc.translated_text.as_deref(), Some(doc.processed_text.as_str()));
    assert!(matches!(
        doc.translation_error,
        Some(ModelError::RequestFailed { retries: 3, .. })
    ));
}

#[tokio::test]
async fn unsupported_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("picture.jpg");
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    let err = process(path.to_str().unwrap(), &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PdfTextError::UnsupportedInput { .. }));
}

// ── Report ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_runs_all_stages_in_order() {
    let client = StagedClient::new();
    let report = generate_report(client.as_ref(), "source text", "").await.unwrap();

    assert_eq!(client.stages(), vec!["research", "content", "format", "score"]);
    assert_eq!(report.content, "# Findings\nThe body.\n\nEnd.\n");
    assert_eq!(report.score.total, 91);
    assert_eq!(report.score.band, OriginalityBand::HighlyOriginal);
    assert_eq!(report.score.analysis, "fresh");
}

#[tokio::test]
async fn report_failure_names_the_stage() {
    let err = generate_report(&DownClient, "text", "").await.unwrap_err();
    match err {
        PdfTextError::Model { stage, .. } => assert_eq!(stage, "research"),
        other => panic!("expected Model error, got {other:?}"),
    }
}

// ── Export ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn html_export_keeps_unicode() {
    let dir = tempfile::tempdir().unwrap();
    let paths = export(
        "# रिपोर्ट\n\nपाठ and text",
        "report_english",
        dir.path(),
        OutputFormat::Html,
    )
    .await
    .unwrap();

    assert_eq!(paths.len(), 1);
    let html = std::fs::read_to_string(&paths[0]).unwrap();
    assert!(html.contains("<title>रिपोर्ट</title>"));
    assert!(html.contains("<p>पाठ and text</p>"));
    assert!(paths[0].ends_with("report_english.html"));
}
