//! Cleanup of model-written Markdown, and flattening of Markdown to plain
//! text for the PDF exporter.
//!
//! [`clean_model_output`] runs after the report's formatting stage. Models
//! wrap answers in fences or emit CRLF line endings despite the prompt; each
//! rule here is a pure `&str → String` pass with its own test.
//!
//! [`strip_markdown`] feeds the PDF exporter, which lays out plain
//! paragraphs and cannot render Markdown syntax.

use once_cell::sync::Lazy;
use regex::Regex;

/// Deterministic cleanup of a model's Markdown answer.
///
/// Rules, in order:
/// 1. Strip one outer ```` ```markdown ```` / ```` ``` ```` fence
/// 2. CRLF and lone CR become LF
/// 3. Trailing whitespace removed per line
/// 4. Runs of blank lines collapse to one blank line
/// 5. Headings get a blank line before them
/// 6. Zero-width space, BOM, soft hyphen and word joiner removed
/// 7. Exactly one final newline
///
/// ZWJ and ZWNJ are kept: they select Devanagari conjunct forms.
pub fn clean_model_output(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = unify_line_endings(&s);
    let s = trim_line_ends(&s);
    let s = squeeze_blank_lines(&s);
    let s = space_headings(&s);
    let s = drop_invisible(&s);
    finish_with_newline(&s)
}

// ── Fences ───────────────────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?[ \t]*\r?\n(.*?)\r?\n```$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    let trimmed = input.trim();
    match RE_OUTER_FENCE.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Whitespace ───────────────────────────────────────────────────────────

fn unify_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_line_ends(input: &str) -> String {
    input.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn squeeze_blank_lines(input: &str) -> String {
    RE_BLANK_RUN.replace_all(input, "\n\n").into_owned()
}

fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}

fn space_headings(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 32);
    for line in input.lines() {
        if is_heading(line) && !out.is_empty() && !out.ends_with("\n\n") {
            out.push('\n');
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn drop_invisible(input: &str) -> String {
    input.replace(['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{2060}'], "")
}

fn finish_with_newline(input: &str) -> String {
    let body = input.trim_end();
    if body.is_empty() {
        "\n".to_string()
    } else {
        format!("{body}\n")
    }
}

// ── Markdown → plain text ────────────────────────────────────────────────

static RE_HEADING_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap());
static RE_FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*```.*$\n?").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\*\*|__)(.+?)(\*\*|__)").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[-*+][ \t]+").unwrap());
static RE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").unwrap());
static RE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*([-*_][ \t]*){3,}$").unwrap());
static RE_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// Remove Markdown syntax, keeping the text it decorates.
///
/// Bullets become `• `; numbered list markers are kept as written.
pub fn strip_markdown(input: &str) -> String {
    let s = RE_FENCE_LINE.replace_all(input, "");
    let s = RE_RULE.replace_all(&s, "");
    let s = RE_HEADING_MARK.replace_all(&s, "");
    let s = RE_QUOTE.replace_all(&s, "");
    let s = RE_IMAGE.replace_all(&s, "$1");
    let s = RE_LINK.replace_all(&s, "$1");
    let s = RE_BOLD.replace_all(&s, "$2");
    let s = RE_ITALIC.replace_all(&s, "$1");
    let s = RE_INLINE_CODE.replace_all(&s, "$1");
    let s = RE_BULLET.replace_all(&s, "${1}• ");
    s.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        assert_eq!(strip_outer_fence("```markdown\n# A\nb\n```"), "# A\nb");
        assert_eq!(strip_outer_fence("```\nx\n```\n"), "x");
        assert_eq!(strip_outer_fence("# A\n```\ncode\n```"), "# A\n```\ncode\n```");
    }

    #[test]
    fn line_endings() {
        assert_eq!(unify_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn blank_runs_collapse_to_one_blank_line() {
        assert_eq!(squeeze_blank_lines("a\n\n\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn headings_get_spacing() {
        assert_eq!(space_headings("text\n## Head\nmore"), "text\n\n## Head\nmore\n");
        assert_eq!(space_headings("# Top\nbody"), "# Top\nbody\n");
        assert_eq!(space_headings("#hashtag\nx"), "#hashtag\nx\n");
    }

    #[test]
    fn invisible_chars_removed_but_joiners_kept() {
        assert_eq!(drop_invisible("a\u{200B}b\u{FEFF}c\u{00AD}d"), "abcd");
        assert_eq!(drop_invisible("क्\u{200D}ष"), "क्\u{200D}ष");
    }

    #[test]
    fn full_cleanup() {
        let raw = "```markdown\r\n# Title  \r\nIntro\r\n\r\n\r\n\r\n## Part\r\nBody\r\n```";
        assert_eq!(clean_model_output(raw), "# Title\nIntro\n\n## Part\nBody\n");
    }

    #[test]
    fn empty_output_is_single_newline() {
        assert_eq!(clean_model_output("  \n\n"), "\n");
    }

    #[test]
    fn strip_markdown_keeps_text() {
        let md = "# Title\n\nSome **bold** and *italic* with [a link](https://x.y).\n\n- one\n- two\n\n```rust\nlet x = 1;\n```\n> quoted `code`\n---\n1. first";
        let plain = strip_markdown(md);
        assert_eq!(
            plain,
            "Title\n\nSome bold and italic with a link.\n\n• one\n• two\n\nlet x = 1;\nquoted code\n\n1. first"
        );
    }
}
