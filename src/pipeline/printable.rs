//! Printable-character predicate and ratio.
//!
//! The ratio is the acceptance heuristic for every candidate decode: a wrong
//! codepage tends to produce control characters, stray format characters and
//! private-use glyphs, while a right one produces readable text.
//!
//! "Printable" here means: the ASCII space, or any character that is not a
//! control, whitespace, format (zero-width, bidi, BOM, soft hyphen) or
//! private-use character. Newlines and tabs are *not* printable, so a decode
//! made of one word per line scores lower than the same words space-separated.
//! Combining marks (Devanagari vowel signs) and U+FFFD are printable.

/// Whether `c` counts towards the printable ratio.
pub fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{00AD}'
            | '\u{061C}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}

/// Fraction of printable characters in `text`.
///
/// An empty string has ratio 0 so that it is always rejected.
pub fn printable_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut printable = 0usize;
    for c in text.chars() {
        total += 1;
        if is_printable(c) {
            printable += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    printable as f32 / total as f32
}
