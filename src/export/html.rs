//! HTML export: Markdown rendered with pulldown-cmark into a standalone page.
//!
//! Unlike the PDF path the text is not sanitised; the page is UTF-8 and keeps
//! Devanagari and every other script as is.

use super::{export_path, write_atomic};
use crate::error::PdfTextError;
use pulldown_cmark::{html, Options, Parser};
use std::path::{Path, PathBuf};
use tracing::info;

/// Render `content` and write `<dir>/<filename_base>.html`.
pub fn export_html(content: &str, filename_base: &str, dir: &Path) -> Result<PathBuf, PdfTextError> {
    let generated = chrono::Local::now().format("%B %d, %Y").to_string();
    let page = render_page(content, filename_base, &generated);
    let path = export_path(dir, filename_base, "html");
    write_atomic(&path, page.as_bytes())?;
    info!("HTML exported: {}", path.display());
    Ok(path)
}

/// Build the complete HTML document. `generated` is the display date.
pub fn render_page(content: &str, filename_base: &str, generated: &str) -> String {
    let title = document_title(content, filename_base);
    let title = html_escape::encode_text(&title);
    let source = html_escape::encode_text(filename_base);

    let mut body = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut body, Parser::new_ext(content, Options::ENABLE_TABLES));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: "Noto Sans", Arial, sans-serif; max-width: 50em; margin: 40px auto; padding: 0 1em; line-height: 1.6; color: #222; }}
h1 {{ color: #333; border-bottom: 2px solid #333; padding-bottom: 10px; }}
p {{ margin-bottom: 15px; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #ccc; padding: 4px 8px; }}
header, footer {{ color: #666; font-size: 0.9em; }}
footer {{ margin-top: 3em; border-top: 1px solid #ddd; padding-top: 1em; }}
</style>
</head>
<body>
<header>Generated on {generated}</header>
<main>
{body}</main>
<footer>Source: {source}</footer>
</body>
</html>
"#
    )
}

/// First `# ` heading, or the filename in title case.
fn document_title(content: &str, filename_base: &str) -> String {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| title_case(filename_base))
}

fn title_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_first_heading() {
        assert_eq!(document_title("intro\n# Real Title \n## Sub", "x"), "Real Title");
    }

    #[test]
    fn title_falls_back_to_filename() {
        assert_eq!(document_title("no heading", "annual_report-2024"), "Annual Report 2024");
        assert_eq!(document_title("#\n", "scan"), "Scan");
    }

    #[test]
    fn page_renders_markdown_and_escapes_title() {
        let md = "# Fish & <Chips>\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\nनमस्ते **world**";
        let page = render_page(md, "menu", "January 02, 2026");
        assert!(page.contains("<title>Fish &amp; &lt;Chips&gt;</title>"));
        assert!(page.contains("<table>"));
        assert!(page.contains("नमस्ते <strong>world</strong>"));
        assert!(page.contains("Generated on January 02, 2026"));
        assert!(page.contains("<footer>Source: menu</footer>"));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_html("# Hi\n\nbody", "doc_english", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("doc_english.html"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<h1>Hi</h1>"));
    }
}
