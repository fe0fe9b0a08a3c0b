//! CLI binary for edgequake-pdftext.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessingConfig`, runs the pipeline and prints or exports the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdftext::pipeline::llm::resolve_client;
use edgequake_pdftext::{
    export, export_basename, generate_report, inspect, process, DecodeMethod, EncodingReport,
    OutputFormat, PageSelection, ParagraphMode, ProcessingConfig, ProcessingProgressCallback,
    ProgressCallback, Report,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────

/// Live progress bar plus one log line per page showing how it was decoded.
struct CliProgressCallback {
    bar: ProgressBar,
    legacy: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Extracting text…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            legacy: AtomicUsize::new(0),
        })
    }

    fn spinner(&self, prefix: &'static str, msg: &'static str) {
        self.bar.reset();
        self.bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        self.bar.set_prefix(prefix);
        self.bar.set_message(msg);
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }
}

impl ProcessingProgressCallback for CliProgressCallback {
    fn on_document_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_prefix("Decoding");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Recovering text from {total} pages…"))
        ));
    }

    fn on_page_complete(&self, page: usize, total: usize, chars: usize, method: &DecodeMethod) {
        let mark = match method {
            DecodeMethod::LegacyScript { .. } => {
                self.legacy.fetch_add(1, Ordering::SeqCst);
                cyan("↺")
            }
            DecodeMethod::LossyUtf8 => yellow("⚠"),
            _ => green("✓"),
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<12}  {}",
            mark,
            page,
            total,
            dim(&format!("{chars:>6} chars")),
            dim(&method.label()),
        ));
        self.bar.inc(1);
    }

    fn on_page_skipped(&self, page: usize, total: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            dim("·"),
            page,
            total,
            dim("no text")
        ));
        self.bar.inc(1);
    }

    fn on_document_complete(&self, total: usize, processed: usize) {
        self.bar.println(format!(
            "{} {}/{} pages recovered  {}",
            green("✔"),
            bold(&processed.to_string()),
            total,
            dim(&format!("({} from legacy fonts)", self.legacy.load(Ordering::SeqCst))),
        ));
        self.bar.finish_and_clear();
    }

    fn on_translation_start(&self) {
        self.spinner("Translating", "waiting for the model…");
    }

    fn on_translation_complete(&self, ok: bool) {
        self.bar.finish_and_clear();
        if ok {
            eprintln!("{} translated to English", green("✔"));
        } else {
            eprintln!(
                "{} translation failed, keeping the untranslated text",
                yellow("⚠")
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Recover text (stdout)
  pdftext scan.pdf

  # Keep paragraph breaks
  pdftext --preserve-paragraphs scan.pdf

  # A raw page dump (pages separated by form feed)
  pdftext pages.txt

  # Translate and export PDF + HTML into ./out
  pdftext --translate --format both -o out scan.pdf

  # Full report with originality score, HTML only
  pdftext --report --brand "Acme Labs" --format html scan.pdf

  # Byte-level encoding analysis (no API key needed)
  pdftext --inspect-only scan.pdf

  # Custom fallback order and a stricter acceptance threshold
  pdftext --encodings utf-8,cp1252,mac_roman --printable-threshold 0.9 scan.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, overrides -v / -q

A model is only needed for --translate and --report.
"#;

/// Recover, translate and re-render text from mis-encoded PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdftext",
    version,
    about = "Recover readable text from PDFs with mis-encoded (legacy Devanagari) text layers",
    long_about = "Extract the text layer of a PDF (or a raw form-feed separated page dump), repair \
legacy-font Devanagari, decode through an ordered chain of encodings, normalise, and optionally \
translate to English, build a report with an originality score, and export PDF/HTML.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF or .txt page dump, or an HTTP/HTTPS URL.
    input: String,

    /// Directory for exported files. Default: exports/<unix-timestamp>.
    #[arg(short, long, env = "PDFTEXT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Output: text (stdout), pdf, html or both.
    #[arg(long, env = "PDFTEXT_FORMAT", value_enum, default_value = "text")]
    format: FormatArg,

    /// Translate the recovered text to English.
    #[arg(long, env = "PDFTEXT_TRANSLATE")]
    translate: bool,

    /// Run the report stages (research, content, formatting, originality score).
    #[arg(long, env = "PDFTEXT_REPORT")]
    report: bool,

    /// Brand context for the report's presentation.
    #[arg(long, env = "PDFTEXT_BRAND", default_value = "")]
    brand: String,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDFTEXT_PAGES", default_value = "all")]
    pages: String,

    /// Keep paragraph breaks instead of flattening all whitespace.
    #[arg(long, env = "PDFTEXT_PRESERVE_PARAGRAPHS")]
    preserve_paragraphs: bool,

    /// Comma-separated fallback encodings, tried in order.
    #[arg(long, env = "PDFTEXT_ENCODINGS", value_delimiter = ',')]
    encodings: Vec<String>,

    /// Printable ratio a fallback decode must exceed (0–1).
    #[arg(long, env = "PDFTEXT_PRINTABLE_THRESHOLD", default_value_t = 0.8)]
    printable_threshold: f32,

    /// Prober confidence that must be exceeded to trust its guess (0–1).
    #[arg(long, env = "PDFTEXT_CONFIDENCE_THRESHOLD", default_value_t = 0.8)]
    confidence_threshold: f32,

    /// Printable ratio the ISCII re-decode must exceed (0–1).
    #[arg(long, env = "PDFTEXT_LEGACY_THRESHOLD", default_value_t = 0.8)]
    legacy_threshold: f32,

    /// Skip the ISCII re-decode after legacy repair.
    #[arg(long, env = "PDFTEXT_NO_ISCII")]
    no_iscii: bool,

    /// Probe only the first N bytes of each page.
    #[arg(long, env = "PDFTEXT_PROBE_BYTES")]
    probe_bytes: Option<usize>,

    /// Also print each page's raw extracted text.
    #[arg(long, env = "PDFTEXT_SHOW_RAW")]
    show_raw: bool,

    /// Print the encoding analysis of each page, no processing.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of text.
    #[arg(long, env = "PDFTEXT_JSON")]
    json: bool,

    /// Model ID (e.g. gemini-2.0-flash, gpt-4.1-nano).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Model provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFTEXT_PASSWORD")]
    password: Option<String>,

    /// Max model output tokens per call.
    #[arg(long, env = "PDFTEXT_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Model temperature (0.0–2.0).
    #[arg(long, env = "PDFTEXT_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Retries per model call.
    #[arg(long, env = "PDFTEXT_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Disable progress bar.
    #[arg(long, env = "PDFTEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFTEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFTEXT_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFTEXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-call model timeout in seconds.
    #[arg(long, env = "PDFTEXT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Text,
    Pdf,
    Html,
    Both,
}

impl FormatArg {
    fn export_format(self) -> Option<OutputFormat> {
        match self {
            FormatArg::Text => None,
            FormatArg::Pdf => Some(OutputFormat::Pdf),
            FormatArg::Html => Some(OutputFormat::Html),
            FormatArg::Both => Some(OutputFormat::Both),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; --verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        let reports = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect input")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&reports).context("Failed to serialise reports")?
            );
        } else {
            println!("File:  {}", cli.input);
            for r in &reports {
                print_encoding_report(r);
            }
        }
        return Ok(());
    }

    // ── Build config and process ─────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ProcessingProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let doc = process(&cli.input, &config)
        .await
        .context("Processing failed")?;
    if let Some(ref e) = doc.translation_error {
        eprintln!("{} Translation failed: {}", yellow("⚠"), e);
    }

    // ── Optional report ──────────────────────────────────────────────────
    let report: Option<Report> = if cli.report {
        let client = resolve_client(&config).context("No model available for --report")?;
        let bar = (!cli.quiet && !cli.json).then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_message("Building report…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        let report = generate_report(client.as_ref(), doc.final_text(), &cli.brand)
            .await
            .context("Report generation failed")?;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        Some(report)
    } else {
        None
    };

    let content = report
        .as_ref()
        .map(|r| r.content.as_str())
        .unwrap_or_else(|| doc.final_text());

    // ── Output ───────────────────────────────────────────────────────────
    match cli.format.export_format() {
        None if cli.json => {
            let value = serde_json::json!({ "document": doc, "report": report });
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Failed to serialise output")?
            );
        }
        None => {
            let mut out = io::stdout().lock();
            if cli.show_raw {
                writeln!(out, "{}", doc.raw_text).context("Failed to write to stdout")?;
            }
            out.write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            if !content.ends_with('\n') {
                out.write_all(b"\n").ok();
            }
        }
        Some(format) => {
            let dir = cli.output_dir.clone().unwrap_or_else(default_export_dir);
            let base = export_basename(&input_stem(&cli.input), doc.translated_text.is_some());
            let written = export(content, &base, &dir, format)
                .await
                .context("Export failed")?;
            if !cli.quiet {
                for path in &written {
                    eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
                }
            }
        }
    }

    if !cli.quiet {
        if let Some(ref r) = report {
            eprintln!(
                "{} Originality: {}/100  {}",
                cyan("◆"),
                bold(&r.score.total.to_string()),
                dim(&r.score.band.to_string())
            );
        }
        if !show_progress {
            eprintln!(
                "Processed {}/{} pages in {}ms ({} legacy, {} lossy, {} skipped)",
                doc.stats.processed_pages,
                doc.stats.total_pages,
                doc.stats.total_duration_ms,
                doc.stats.legacy_pages,
                doc.stats.lossy_pages,
                doc.stats.skipped_pages,
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ProcessingConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ProcessingConfig> {
    let mut builder = ProcessingConfig::builder()
        .pages(parse_pages(&cli.pages)?)
        .paragraph_mode(if cli.preserve_paragraphs {
            ParagraphMode::Preserve
        } else {
            ParagraphMode::Flatten
        })
        .printable_threshold(cli.printable_threshold)
        .confidence_threshold(cli.confidence_threshold)
        .legacy_acceptance_threshold(cli.legacy_threshold)
        .iscii_redecode(!cli.no_iscii)
        .translate(cli.translate)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if !cli.encodings.is_empty() {
        let labels: Vec<&str> = cli.encodings.iter().map(|s| s.trim()).collect();
        builder = builder
            .fallback_labels(&labels)
            .context("Invalid --encodings")?;
    }
    if let Some(n) = cli.probe_bytes {
        builder = builder.probe_sample_bytes(n);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_encoding_report(r: &EncodingReport) {
    println!();
    println!("Page {}  ({} bytes)", r.page_num, r.byte_len);
    println!(
        "  Guess:          {} ({:.0}%)",
        r.guess.candidate_name,
        r.guess.confidence * 100.0
    );
    println!("  Hex:            {}", r.hex);
    println!("  Binary:         {}", r.binary);
    println!("  ASCII:          {}", r.ascii);
    println!("  High-bit bytes: {}", yes_no(r.high_bit));
    println!("  Pure ASCII:     {}", yes_no(r.pure_ascii));
    println!("  Null bytes:     {}", yes_no(r.null_bytes));
    println!("  Legacy markers: {}", yes_no(r.legacy_markers));
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "yes"
    } else {
        "no"
    }
}

fn default_export_dir() -> PathBuf {
    Path::new("exports").join(chrono::Local::now().timestamp().to_string())
}

/// File stem of a path or of a URL's last path segment.
fn input_stem(input: &str) -> String {
    let without_query = input.split(['?', '#']).next().unwrap_or(input);
    let last = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(without_query);
    Path::new(last)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    let page_number = |p: &str| -> Result<usize> {
        let n: usize = p
            .trim()
            .parse()
            .with_context(|| format!("Invalid page number: '{}'", p.trim()))?;
        if n < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", n);
        }
        Ok(n)
    };

    if let Some((start, end)) = s.split_once('-') {
        let (start, end) = (page_number(start)?, page_number(end)?);
        if start > end {
            anyhow::bail!("Invalid page range '{}-{}': start must be <= end", start, end);
        }
        return Ok(PageSelection::Range(start, end));
    }

    if s.contains(',') {
        let pages = s.split(',').map(page_number).collect::<Result<Vec<_>>>()?;
        return Ok(PageSelection::Set(pages));
    }

    Ok(PageSelection::Single(page_number(&s)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_parse() {
        assert!(matches!(parse_pages("ALL").unwrap(), PageSelection::All));
        assert!(matches!(parse_pages("4").unwrap(), PageSelection::Single(4)));
        assert!(matches!(parse_pages("2-5").unwrap(), PageSelection::Range(2, 5)));
        match parse_pages("1, 3,5").unwrap() {
            PageSelection::Set(p) => assert_eq!(p, vec![1, 3, 5]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("5-2").is_err());
        assert!(parse_pages("x").is_err());
    }

    #[test]
    fn stems_from_paths_and_urls() {
        assert_eq!(input_stem("/tmp/scan.pdf"), "scan");
        assert_eq!(input_stem("https://host/a/report.pdf?dl=1"), "report");
        assert_eq!(input_stem("https://host/"), "host");
        assert_eq!(input_stem(""), "document");
    }

    #[test]
    fn cli_maps_to_config() {
        let cli = Cli::parse_from([
            "pdftext",
            "--preserve-paragraphs",
            "--encodings",
            "utf-8,cp1252",
            "--no-iscii",
            "--pages",
            "2",
            "doc.pdf",
        ]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.paragraph_mode, ParagraphMode::Preserve);
        assert_eq!(config.fallback_encodings.len(), 2);
        assert!(!config.iscii_redecode);
        assert!(matches!(config.pages, PageSelection::Single(2)));
    }

    #[test]
    fn inspect_settings_come_from_cli() {
        let cli = Cli::parse_from([
            "pdftext",
            "--inspect-only",
            "--password",
            "hunter2",
            "--download-timeout",
            "7",
            "locked.pdf",
        ]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.download_timeout_secs, 7);
    }
}
