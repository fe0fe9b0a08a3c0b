//! PDF export: sanitised plain text laid out on A4 pages in Helvetica.
//!
//! Layout is computed up front by [`layout`] (pure, unit-tested) and then
//! drawn with pdfium text objects. Helvetica is one of the PDF standard-14
//! fonts and only covers Latin-1, hence the sanitiser.

use super::{export_path, write_atomic};
use crate::error::PdfTextError;
use crate::pipeline::extract::bind_pdfium;
use crate::pipeline::postprocess::strip_markdown;
use crate::pipeline::sanitize::sanitize_for_legacy_renderer;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 72.0;
const TITLE_SIZE: f32 = 24.0;
const BODY_SIZE: f32 = 12.0;
const LINE_SPACING: f32 = 1.4;
const TITLE_SPACE_AFTER: f32 = 30.0;
const BODY_SPACE_AFTER: f32 = 12.0;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

/// One line of text at its final position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedLine {
    pub x: f32,
    /// Baseline, measured from the bottom of the page.
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    pub text: String,
}

/// Render `content` and write `<dir>/<filename_base>.pdf`.
///
/// Blocking: pdfium runs on the calling thread.
pub fn export_pdf(content: &str, filename_base: &str, dir: &Path) -> Result<PathBuf, PdfTextError> {
    let path = export_path(dir, filename_base, "pdf");
    let paragraphs = paragraphs(&prepare_text(content));
    let pages = layout(&paragraphs);
    debug!(
        "PDF layout: {} paragraphs on {} pages",
        paragraphs.len(),
        pages.len()
    );

    let bytes = render(&pages).map_err(|detail| PdfTextError::ExportFailed {
        path: path.clone(),
        detail,
    })?;
    write_atomic(&path, &bytes)?;
    info!("PDF exported: {}", path.display());
    Ok(path)
}

// ── Text preparation ─────────────────────────────────────────────────────

/// Stylesheet debris removed, Markdown stripped, sanitised to Latin-1.
pub(crate) fn prepare_text(content: &str) -> String {
    let kept = content
        .lines()
        .filter(|line| {
            let l = line.trim_start();
            !(l.starts_with("style") || l.starts_with("/*") || l.starts_with("*/"))
        })
        .collect::<Vec<_>>()
        .join("\n");
    sanitize_for_legacy_renderer(&strip_markdown(&kept))
}

static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Blank-line separated paragraphs, each joined onto one line.
pub(crate) fn paragraphs(text: &str) -> Vec<String> {
    RE_PARAGRAPH_BREAK
        .split(text)
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

// ── Layout ───────────────────────────────────────────────────────────────

fn chars_per_line(size: f32) -> usize {
    (((PAGE_WIDTH - 2.0 * MARGIN) / (size * AVG_GLYPH_EM)) as usize).max(1)
}

/// Greedy word wrap to `width` characters; over-long words are split.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(width) {
            let piece: String = piece.iter().collect();
            let piece_len = piece.chars().count();
            if current_len > 0 && current_len + 1 + piece_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Place every line. The first paragraph is the bold 24 pt title; the rest is
/// 12 pt body text. Always returns at least one (possibly empty) page.
pub(crate) fn layout(paragraphs: &[String]) -> Vec<Vec<PlacedLine>> {
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let top = PAGE_HEIGHT - MARGIN;
    let mut cursor = top;

    for (i, paragraph) in paragraphs.iter().enumerate() {
        let is_title = i == 0;
        let (size, space_after) = if is_title {
            (TITLE_SIZE, TITLE_SPACE_AFTER)
        } else {
            (BODY_SIZE, BODY_SPACE_AFTER)
        };
        let line_height = size * LINE_SPACING;

        for text in wrap(paragraph, chars_per_line(size)) {
            if cursor - line_height < MARGIN {
                pages.push(Vec::new());
                cursor = top;
            }
            cursor -= line_height;
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    x: MARGIN,
                    y: cursor,
                    size,
                    bold: is_title,
                    text,
                });
            }
        }
        cursor -= space_after;
    }
    pages
}

// ── Rendering ────────────────────────────────────────────────────────────

fn render(pages: &[Vec<PlacedLine>]) -> Result<Vec<u8>, String> {
    let pdfium = bind_pdfium().map_err(|e| e.to_string())?;
    let fail = |e: PdfiumError| format!("{:?}", e);

    let mut document = pdfium.create_new_pdf().map_err(fail)?;
    let regular = document.fonts_mut().helvetica();
    let bold = document.fonts_mut().helvetica_bold();

    for lines in pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(fail)?;
        for line in lines {
            let font = if line.bold { bold } else { regular };
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(line.x),
                    PdfPoints::new(line.y),
                    &line.text,
                    font,
                    PdfPoints::new(line.size),
                )
                .map_err(fail)?;
        }
    }

    document.save_to_bytes().map_err(fail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_wraps_at_seventy_five_chars() {
        assert_eq!(chars_per_line(BODY_SIZE), 75);
        assert_eq!(chars_per_line(TITLE_SIZE), 37);
    }

    #[test]
    fn wrap_is_greedy_and_splits_long_words() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn prepare_drops_markup_and_style_lines() {
        let text = prepare_text("# Title\n\nstyle { color: red }\n/* note */\nBody \u{2014} **text**");
        assert_eq!(text, "Title\n\nBody -- text");
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let p = paragraphs("Title\n\nline one\nline two\n \n\n\nlast");
        assert_eq!(p, vec!["Title", "line one line two", "last"]);
    }

    #[test]
    fn first_paragraph_is_title() {
        let pages = layout(&["Heading".to_string(), "Body".to_string()]);
        assert_eq!(pages.len(), 1);
        let lines = &pages[0];
        assert!(lines[0].bold);
        assert_eq!(lines[0].size, TITLE_SIZE);
        assert!(!lines[1].bold);
        assert_eq!(lines[1].size, BODY_SIZE);
        assert!(lines[1].y < lines[0].y);
        assert_eq!(lines[0].x, MARGIN);
    }

    #[test]
    fn long_text_flows_onto_new_pages() {
        let mut paras = vec!["T".to_string()];
        paras.extend((0..80).map(|i| format!("paragraph {i}")));
        let pages = layout(&paras);
        assert!(pages.len() > 1);
        for line in pages.iter().flatten() {
            assert!(line.y >= MARGIN);
            assert!(line.y <= PAGE_HEIGHT - MARGIN);
        }
        let total: usize = pages.iter().map(Vec::len).sum();
        assert_eq!(total, 81);
    }

    #[test]
    fn empty_content_still_has_a_page() {
        let pages = layout(&[]);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }
}
