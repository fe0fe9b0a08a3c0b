//! Export-path downgrade for renderers limited to an 8-bit character set.
//!
//! The PDF exporter draws with a built-in Type 1 font that only covers
//! Latin-1. Typographic punctuation and common symbols are spelled out in
//! ASCII first; anything still at or above U+0100 is then dropped.
//!
//! The HTML exporter keeps full Unicode and never calls this.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Unicode character → ASCII-safe replacement.
const REPLACEMENTS: [(char, &str); 88] = [
    // dashes and hyphens
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2012}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2015}', "--"),
    ('\u{2212}', "-"),
    // quotes
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', "'"),
    ('\u{2039}', "<"),
    ('\u{203A}', ">"),
    // primes and reversed primes
    ('\u{2032}', "'"),
    ('\u{2033}', "\""),
    ('\u{2034}', "\""),
    ('\u{2035}', "`"),
    ('\u{2036}', "``"),
    ('\u{2037}', "```"),
    ('\u{2038}', "^"),
    // general punctuation
    ('\u{2026}', "..."),
    ('\u{2022}', "*"),
    ('\u{2023}', ">"),
    ('\u{2043}', "-"),
    ('\u{203B}', "*"),
    ('\u{203C}', "!!"),
    ('\u{2047}', "??"),
    ('\u{2048}', "?!"),
    ('\u{2049}', "!?"),
    ('\u{204E}', "*"),
    ('\u{204F}', ";"),
    ('\u{2050}', "P"),
    ('\u{2051}', "**"),
    ('\u{2052}', "%"),
    ('\u{2053}', "~"),
    ('\u{2054}', "_"),
    ('\u{2055}', "*"),
    ('\u{2056}', "..."),
    ('\u{2057}', "...."),
    ('\u{2058}', "-"),
    ('\u{2059}', "....."),
    ('\u{205A}', ".."),
    ('\u{205B}', "...."),
    ('\u{205C}', "..."),
    ('\u{205D}', "..."),
    ('\u{205E}', "...."),
    ('\u{2020}', "+"),
    ('\u{2021}', "++"),
    // arrows
    ('\u{2192}', "->"),
    ('\u{2190}', "<-"),
    ('\u{2194}', "<->"),
    ('\u{21D2}', "=>"),
    ('\u{21D0}', "<="),
    ('\u{2191}', "^"),
    ('\u{2193}', "v"),
    // maths
    ('\u{00B1}', "+/-"),
    ('\u{00D7}', "x"),
    ('\u{00F7}', "/"),
    ('\u{00B0}', " deg"),
    ('\u{2264}', "<="),
    ('\u{2265}', ">="),
    ('\u{2260}', "!="),
    ('\u{2248}', "~="),
    ('\u{221E}', "infinity"),
    ('\u{221A}', "sqrt"),
    // Greek
    ('\u{03A9}', "Ohm"),
    ('\u{2126}', "Ohm"),
    ('\u{03B1}', "alpha"),
    ('\u{03B2}', "beta"),
    ('\u{03B3}', "gamma"),
    ('\u{03B4}', "delta"),
    ('\u{03B5}', "epsilon"),
    ('\u{03B8}', "theta"),
    ('\u{03BB}', "lambda"),
    ('\u{03BC}', "mu"),
    ('\u{03C0}', "pi"),
    ('\u{03C3}', "sigma"),
    // marks and currency
    ('\u{00A9}', "(c)"),
    ('\u{00AE}', "(R)"),
    ('\u{2122}', "(TM)"),
    ('\u{00A7}', "S"),
    ('\u{00B6}', "P"),
    ('\u{20AC}', "EUR"),
    ('\u{00A3}', "GBP"),
    ('\u{00A5}', "JPY"),
    ('\u{20B9}', "INR"),
];

static REPLACEMENT_TABLE: Lazy<HashMap<char, &'static str>> =
    Lazy::new(|| REPLACEMENTS.iter().copied().collect());

/// Downgrade `text` for an 8-bit renderer.
///
/// The output never contains a code point at or above U+0100. Latin-1
/// letters such as `é` are kept.
pub fn sanitize_for_legacy_renderer(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match REPLACEMENT_TABLE.get(&c) {
            Some(replacement) => out.push_str(replacement),
            None if (c as u32) < 0x100 => out.push(c),
            None => {}
        }
    }
    out
}
