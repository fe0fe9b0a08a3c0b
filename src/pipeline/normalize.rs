//! Text normaliser and the generic text cleaner.
//!
//! [`normalize`] tidies decoded text: unprintable characters go, whitespace
//! collapses, and a handful of well-known mis-encoding artefacts are fixed.
//! [`clean_text`] is the character-class filter every page passes through
//! before it is concatenated into the document.
//!
//! Both honour [`ParagraphMode`]. In the default `Flatten` mode every
//! whitespace run, newlines included, becomes a single space.

use crate::config::ParagraphMode;
use crate::pipeline::printable::is_printable;
use once_cell::sync::Lazy;
use regex::Regex;

/// Mis-encoding artefacts and their fixes, applied in this order.
///
/// The first three are UTF-8 punctuation read as windows-1252; the quote
/// fallback must come after the longer sequences it is a prefix of.
const ARTIFACT_FIXES: [(&str, &str); 6] = [
    ("â€™", "'"),
    ("â€œ", "\""),
    ("â€", "\""),
    ("Â", ""),
    ("degü", "deg"),
    ("(c)", "©"),
];

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static RE_NOT_KEPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,;:!?\-()\[\]{}]").unwrap());

/// Normalise `text` with the default [`ParagraphMode::Flatten`].
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    normalize_with(text, ParagraphMode::Flatten)
}

/// Normalise `text` under the given paragraph mode.
pub fn normalize_with(text: &str, mode: ParagraphMode) -> String {
    let kept: String = text
        .chars()
        .filter(|&c| is_printable(c) || c == '\n' || c == '\t')
        .collect();
    let collapsed = collapse(&kept, mode);
    let fixed = fix_artifacts(&collapsed);
    let collapsed = collapse(&fixed, mode);
    RE_BLANK_RUN
        .replace_all(&collapsed, "\n\n")
        .trim()
        .to_string()
}

/// Generic cleaner: collapse whitespace, then drop everything that is not a
/// word character, whitespace or basic punctuation, then trim.
///
/// Word characters are Unicode-aware and include combining marks, so
/// Devanagari vowel signs survive.
pub fn clean_text(text: &str, mode: ParagraphMode) -> String {
    let collapsed = collapse(text, mode);
    let filtered = RE_NOT_KEPT.replace_all(&collapsed, "");
    let collapsed = match mode {
        ParagraphMode::Flatten => filtered.into_owned(),
        // removing a whole line's content can leave a longer blank-line run
        ParagraphMode::Preserve => RE_BLANK_RUN
            .replace_all(&collapse(&filtered, mode), "\n\n")
            .into_owned(),
    };
    collapsed.trim().to_string()
}

fn collapse(text: &str, mode: ParagraphMode) -> String {
    match mode {
        ParagraphMode::Flatten => RE_WHITESPACE.replace_all(text, " ").into_owned(),
        ParagraphMode::Preserve => {
            let horizontal = RE_HORIZONTAL_WS.replace_all(text, " ");
            horizontal
                .split('\n')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Apply [`ARTIFACT_FIXES`] until the text stops changing. Every fix
/// shortens the text, so this terminates.
fn fix_artifacts(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = ARTIFACT_FIXES
            .iter()
            .fold(current.clone(), |acc, (from, to)| acc.replace(from, to));
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_is_untouched() {
        assert_eq!(normalize("Hello World"), "Hello World");
    }

    #[test]
    fn leading_spaces_are_trimmed() {
        assert_eq!(normalize("   Hello"), "Hello");
        assert_eq!(normalize_with("   Hello", ParagraphMode::Preserve), "Hello");
    }

    #[test]
    fn flatten_collapses_newlines() {
        assert_eq!(normalize("one\n\n\ntwo\tthree"), "one two three");
    }

    #[test]
    fn preserve_keeps_exactly_one_blank_line() {
        let input = "First paragraph.\n\n\nSecond   paragraph.\n   \n\n\nThird.";
        assert_eq!(
            normalize_with(input, ParagraphMode::Preserve),
            "First paragraph.\n\nSecond paragraph.\n\nThird."
        );
    }

    #[test]
    fn preserve_keeps_single_line_breaks() {
        assert_eq!(
            normalize_with("line one  \n  line two", ParagraphMode::Preserve),
            "line one\nline two"
        );
    }

    #[test]
    fn unprintable_characters_are_removed() {
        assert_eq!(normalize("a\u{0}b\u{200B}c\u{7}"), "abc");
    }

    #[test]
    fn artifacts_are_fixed() {
        assert_eq!(normalize("It\u{e2}\u{20ac}\u{2122}s"), "It's");
        assert_eq!(normalize("\u{e2}\u{20ac}\u{153}quoted\u{e2}\u{20ac}"), "\"quoted\"");
        assert_eq!(normalize("Â 90 degü (c) 2024"), "90 deg © 2024");
    }

    #[test]
    fn nested_artifacts_reach_fixpoint() {
        assert_eq!(normalize("30 degüü"), "30 deg");
        assert_eq!(normalize("30 degdegüü"), "30 degdeg");
        assert_eq!(normalize("ÂÂ"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "  Hello   World  ",
            "para\n\n\n\npara",
            "ÂÂâ€™ degdegüü (c)",
            "नमस्ते\u{200B} दुनिया",
            "\t\ttabs\tand\nnewlines\n",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "flatten: {s:?}");
            let once = normalize_with(s, ParagraphMode::Preserve);
            assert_eq!(
                normalize_with(&once, ParagraphMode::Preserve),
                once,
                "preserve: {s:?}"
            );
        }
    }

    #[test]
    fn clean_text_keeps_words_and_basic_punctuation() {
        assert_eq!(
            clean_text("Hello, world! (test) [x] {y} a-b; c: d? e.", ParagraphMode::Flatten),
            "Hello, world! (test) [x] {y} a-b; c: d? e."
        );
    }

    #[test]
    fn clean_text_drops_symbols() {
        assert_eq!(clean_text("price: $5 @ 50% #1", ParagraphMode::Flatten), "price: 5  50 1");
    }

    #[test]
    fn clean_text_keeps_devanagari_marks() {
        assert_eq!(clean_text("नमस्ते।", ParagraphMode::Flatten), "नमस्ते");
    }

    #[test]
    fn clean_text_preserve_mode_keeps_paragraphs() {
        assert_eq!(
            clean_text("one *\n\n**\n\ntwo", ParagraphMode::Preserve),
            "one\n\ntwo"
        );
    }
}
