//! Legacy-script repair: Devanagari text that was stored as ISCII (or a
//! font-specific 8-bit layout) and then read through a Latin codepage.
//!
//! The corruption is a deterministic codepage misread, so a static
//! substitution table recovers the glyphs without a full codec. It must only
//! run when the text actually shows the misread, otherwise genuinely Latin
//! text would be destroyed; [`looks_like_legacy_script`] is that gate.
//!
//! After substitution, [`recover`] optionally re-decodes whatever Latin-1
//! bytes are left with a real ISCII-91 codec and keeps the result only when
//! it is printable enough.

use crate::pipeline::printable::printable_ratio;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Characters that, when present, indicate Devanagari bytes read as Latin-1.
pub const LEGACY_MARKERS: [char; 9] = ['É', 'ú', 'ù', 'þ', 'ò', 'ä', 'æ', 'Î', 'õ'];

/// Mis-decoded Latin-1 character → Devanagari code point.
///
/// Several Latin letters collapse onto the same sign: the legacy fonts reused
/// neighbouring slots for glyph variants of one vowel sign.
const REPAIR_ENTRIES: [(char, char); 56] = [
    ('É', 'ा'),
    ('Ê', 'ि'),
    ('Î', 'ि'),
    ('Æ', 'ं'),
    ('Ç', 'च'),
    ('¨', 'म'),
    ('½', 'ह'),
    ('º', 'स'),
    ('ª', 'य'),
    ('¦', 'भ'),
    ('Ò', 'ी'),
    ('Ó', 'ी'),
    ('Ô', 'ी'),
    ('Õ', 'ी'),
    ('Ö', 'ी'),
    ('×', 'ी'),
    ('Ø', 'ी'),
    ('Ù', 'ी'),
    ('Ú', 'ी'),
    ('Û', 'ी'),
    ('Ü', 'ी'),
    ('Ý', 'ी'),
    ('Þ', 'ी'),
    ('ß', 'ी'),
    ('à', 'ी'),
    ('á', 'ी'),
    ('â', 'ी'),
    ('ã', 'ी'),
    ('ä', 'े'),
    ('å', 'े'),
    ('æ', 'ो'),
    ('ç', 'ो'),
    ('è', 'ै'),
    ('é', 'ै'),
    ('ê', 'ै'),
    ('ë', 'ै'),
    ('ì', 'ै'),
    ('í', 'ै'),
    ('î', 'ै'),
    ('ï', 'ै'),
    ('ð', 'ै'),
    ('ñ', 'ै'),
    ('ò', 'क'),
    ('ó', 'क'),
    ('ô', 'क'),
    ('õ', 'ट'),
    ('ö', 'ट'),
    ('÷', 'ट'),
    ('ø', 'ट'),
    ('ù', 'द'),
    ('ú', 'र'),
    ('û', 'र'),
    ('ü', 'र'),
    ('ý', 'र'),
    ('þ', 'ह'),
    ('ÿ', 'ह'),
];

static REPAIR_TABLE: Lazy<HashMap<char, char>> =
    Lazy::new(|| REPAIR_ENTRIES.iter().copied().collect());

/// Whether `text` contains any legacy-script marker.
pub fn looks_like_legacy_script(text: &str) -> bool {
    text.chars().any(|c| LEGACY_MARKERS.contains(&c))
}

/// Apply the substitution table in one left-to-right pass.
///
/// Identity when the text has no markers. Devanagari output is outside the
/// table's domain, so repairing twice changes nothing.
pub fn repair(text: &str) -> String {
    if !looks_like_legacy_script(text) {
        return text.to_string();
    }
    substitute(text)
}

fn substitute(text: &str) -> String {
    text.chars()
        .map(|c| REPAIR_TABLE.get(&c).copied().unwrap_or(c))
        .collect()
}

/// Result of [`recover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRecovery {
    /// Repaired text (ISCII re-decode applied if it was accepted).
    pub text: String,
    /// Whether the ISCII re-decode was accepted.
    pub iscii: bool,
}

/// Repair `text` and try an ISCII re-decode of the remaining Latin-1 bytes.
///
/// Returns `None` when the text shows no legacy markers. The re-decode is
/// kept only if it changed something and its printable ratio is strictly
/// above `acceptance_threshold`; otherwise the plain substitution result is
/// returned.
///
/// The re-decode works on the whole page, not only next to repaired
/// characters. A genuine Latin-1 symbol on a legacy page is read as its
/// ISCII byte too, so `25°C` becomes `25ओC`. Pages that mix real Latin-1
/// punctuation with legacy glyphs should be decoded with `iscii_redecode`
/// off.
pub fn recover(
    text: &str,
    iscii_redecode: bool,
    acceptance_threshold: f32,
) -> Option<LegacyRecovery> {
    if !looks_like_legacy_script(text) {
        return None;
    }
    let substituted = substitute(text);

    if iscii_redecode {
        let decoded = decode_iscii_mixed(&substituted);
        if decoded != substituted && printable_ratio(&decoded) > acceptance_threshold {
            return Some(LegacyRecovery {
                text: decoded,
                iscii: true,
            });
        }
    }

    Some(LegacyRecovery {
        text: substituted,
        iscii: false,
    })
}

// ── ISCII-91 (Devanagari) ────────────────────────────────────────────────────

const ISCII_INV: u8 = 0xD9;
const ISCII_HALANT: u8 = 0xE8;
const ISCII_NUKTA: u8 = 0xE9;

/// ISCII-91 Devanagari, bytes 0xA1..=0xFA. `None` marks undefined slots.
const ISCII_HIGH: [Option<char>; 90] = [
    Some('\u{0901}'), // A1 candrabindu
    Some('\u{0902}'), // A2 anusvara
    Some('\u{0903}'), // A3 visarga
    Some('\u{0905}'), // A4 a
    Some('\u{0906}'), // A5 aa
    Some('\u{0907}'), // A6 i
    Some('\u{0908}'), // A7 ii
    Some('\u{0909}'), // A8 u
    Some('\u{090A}'), // A9 uu
    Some('\u{090B}'), // AA vocalic r
    Some('\u{090E}'), // AB short e
    Some('\u{090F}'), // AC e
    Some('\u{0910}'), // AD ai
    Some('\u{090D}'), // AE candra e
    Some('\u{0912}'), // AF short o
    Some('\u{0913}'), // B0 o
    Some('\u{0914}'), // B1 au
    Some('\u{0911}'), // B2 candra o
    Some('\u{0915}'), // B3 ka
    Some('\u{0916}'),
    Some('\u{0917}'),
    Some('\u{0918}'),
    Some('\u{0919}'),
    Some('\u{091A}'), // B8 ca
    Some('\u{091B}'),
    Some('\u{091C}'),
    Some('\u{091D}'),
    Some('\u{091E}'),
    Some('\u{091F}'), // BD tta
    Some('\u{0920}'),
    Some('\u{0921}'),
    Some('\u{0922}'),
    Some('\u{0923}'),
    Some('\u{0924}'), // C2 ta
    Some('\u{0925}'),
    Some('\u{0926}'),
    Some('\u{0927}'),
    Some('\u{0928}'),
    Some('\u{0929}'),
    Some('\u{092A}'), // C8 pa
    Some('\u{092B}'),
    Some('\u{092C}'),
    Some('\u{092D}'),
    Some('\u{092E}'),
    Some('\u{092F}'), // CD ya
    Some('\u{095F}'),
    Some('\u{0930}'), // CF ra
    Some('\u{0931}'),
    Some('\u{0932}'),
    Some('\u{0933}'),
    Some('\u{0934}'),
    Some('\u{0935}'), // D4 va
    Some('\u{0936}'),
    Some('\u{0937}'),
    Some('\u{0938}'),
    Some('\u{0939}'), // D8 ha
    None,             // D9 INV, handled before lookup
    Some('\u{093E}'), // DA aa sign
    Some('\u{093F}'),
    Some('\u{0940}'),
    Some('\u{0941}'),
    Some('\u{0942}'),
    Some('\u{0943}'),
    Some('\u{0946}'), // E0
    Some('\u{0947}'),
    Some('\u{0948}'),
    Some('\u{0945}'),
    Some('\u{094A}'),
    Some('\u{094B}'),
    Some('\u{094C}'),
    Some('\u{0949}'),
    Some('\u{094D}'), // E8 halant
    Some('\u{093C}'), // E9 nukta
    Some('\u{0964}'), // EA danda
    None,
    None,
    None,
    None,
    None,
    None, // F0 attribute
    Some('\u{0966}'), // F1 digit zero
    Some('\u{0967}'),
    Some('\u{0968}'),
    Some('\u{0969}'),
    Some('\u{096A}'),
    Some('\u{096B}'),
    Some('\u{096C}'),
    Some('\u{096D}'),
    Some('\u{096E}'),
    Some('\u{096F}'), // FA digit nine
];

fn iscii_char(byte: u8) -> Option<char> {
    match byte {
        0x00..=0x7F => Some(byte as char),
        0xA1..=0xFA => ISCII_HIGH[(byte - 0xA1) as usize],
        _ => None,
    }
}

/// Byte + nukta pairs that form a distinct letter.
fn iscii_nukta_form(byte: u8) -> Option<char> {
    match byte {
        0xA1 => Some('\u{0950}'), // om
        0xA6 => Some('\u{090C}'),
        0xA7 => Some('\u{0961}'),
        0xAA => Some('\u{0960}'),
        0xDB => Some('\u{0962}'),
        0xDC => Some('\u{0963}'),
        0xDF => Some('\u{0944}'),
        0xEA => Some('\u{093D}'), // avagraha
        _ => None,
    }
}

/// Decode ISCII-91 bytes, replacing undefined bytes with U+FFFD.
pub fn decode_iscii(bytes: &[u8]) -> String {
    let units: Vec<Unit> = bytes.iter().map(|&b| Unit::Byte(b)).collect();
    decode_units(&units)
}

/// ISCII-decode the characters of `text` below U+0100 as the original bytes;
/// characters at or above U+0100 are already recovered and pass through.
fn decode_iscii_mixed(text: &str) -> String {
    let units: Vec<Unit> = text
        .chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) => Unit::Byte(b),
            Err(_) => Unit::Char(c),
        })
        .collect();
    decode_units(&units)
}

#[derive(Clone, Copy)]
enum Unit {
    Byte(u8),
    Char(char),
}

fn decode_units(units: &[Unit]) -> String {
    let mut out = String::with_capacity(units.len() * 3);
    let mut i = 0;
    while i < units.len() {
        let byte = match units[i] {
            Unit::Char(c) => {
                out.push(c);
                i += 1;
                continue;
            }
            Unit::Byte(b) => b,
        };
        let next = match units.get(i + 1) {
            Some(Unit::Byte(b)) => Some(*b),
            _ => None,
        };

        match (byte, next) {
            (ISCII_INV, _) => {
                i += 1;
            }
            // explicit halant (halant + halant) and soft halant (halant + nukta)
            (ISCII_HALANT, Some(ISCII_HALANT)) => {
                out.push('\u{094D}');
                out.push('\u{200C}');
                i += 2;
            }
            (ISCII_HALANT, Some(ISCII_NUKTA)) => {
                out.push('\u{094D}');
                out.push('\u{200D}');
                i += 2;
            }
            (b, Some(ISCII_NUKTA)) if iscii_nukta_form(b).is_some() => {
                if let Some(c) = iscii_nukta_form(b) {
                    out.push(c);
                }
                i += 2;
            }
            (b, _) => {
                out.push(iscii_char(b).unwrap_or('\u{FFFD}'));
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_keys_are_unique_latin1() {
        assert_eq!(REPAIR_TABLE.len(), REPAIR_ENTRIES.len());
        for (k, _) in REPAIR_ENTRIES {
            assert!((k as u32) < 256, "key {k:?} outside Latin-1");
        }
    }

    #[test]
    fn every_marker_is_mapped() {
        for m in LEGACY_MARKERS {
            assert!(REPAIR_TABLE.contains_key(&m), "marker {m:?} unmapped");
        }
    }

    #[test]
    fn detects_markers() {
        assert!(looks_like_legacy_script("ÉÊú"));
        assert!(!looks_like_legacy_script("plain English text"));
        assert!(!looks_like_legacy_script("नमस्ते"));
    }

    #[test]
    fn repair_is_identity_without_markers() {
        for text in ["Hello World", "café", "naïve résumé", "नमस्ते", ""] {
            assert_eq!(repair(text), text);
        }
    }

    #[test]
    fn repair_maps_marker_and_neighbours() {
        // É marker next to other mapped characters and an unmapped ASCII letter
        assert_eq!(repair("ÉúùX"), "ारदX");
        assert_eq!(repair("òÉ ºÉ"), "का सा");
    }

    #[test]
    fn repair_is_stable_on_repaired_output() {
        let once = repair("ºÉèú þÉä");
        assert_eq!(repair(&once), once);
    }

    #[test]
    fn duplicate_keys_take_last_mapping() {
        assert_eq!(repair("Éä"), "ाे");
        assert_eq!(repair("Éè"), "ाै");
    }

    #[test]
    fn recover_none_without_markers() {
        assert_eq!(recover("abc", true, 0.8), None);
    }

    #[test]
    fn recover_accepts_iscii_redecode() {
        // 'Ì' (0xCC) is not in the table; ISCII maps it to म
        let r = recover("ÉÌ", true, 0.8).unwrap();
        assert!(r.iscii);
        assert_eq!(r.text, "ाम");
    }

    #[test]
    fn recover_keeps_substitution_when_redecode_is_unprintable() {
        // 0x80..0xA0 are undefined in ISCII; with a threshold of 1.0 nothing passes
        let r = recover("É\u{85}", true, 1.0).unwrap();
        assert!(!r.iscii);
        assert_eq!(r.text, "ा\u{85}");
    }

    #[test]
    fn recover_reports_no_iscii_when_nothing_was_left_to_decode() {
        let r = recover("ºÉ", true, 0.8).unwrap();
        assert!(!r.iscii);
        assert_eq!(r.text, "सा");
    }

    #[test]
    fn redecode_reads_every_latin1_character_on_the_page() {
        let r = recover("ºÉ 25°C", true, 0.8).unwrap();
        assert!(r.iscii);
        assert_eq!(r.text, "सा 25ओC");

        let r = recover("ºÉ 25°C", false, 0.8).unwrap();
        assert_eq!(r.text, "सा 25°C");
    }

    #[test]
    fn recover_without_redecode_is_plain_repair() {
        let r = recover("ÉÌ", false, 0.8).unwrap();
        assert!(!r.iscii);
        assert_eq!(r.text, "ाÌ");
    }

    #[test]
    fn iscii_decodes_word() {
        // "namaste": na ma sa halant ta e-sign
        let bytes = [0xC6, 0xCC, 0xD7, 0xE8, 0xC2, 0xE1];
        assert_eq!(decode_iscii(&bytes), "नमस्ते");
    }

    #[test]
    fn iscii_nukta_forms_and_controls() {
        assert_eq!(decode_iscii(&[0xA1, 0xE9]), "ॐ");
        assert_eq!(decode_iscii(&[0xB3, 0xE8, 0xE8]), "क्\u{200C}");
        assert_eq!(decode_iscii(&[0xB3, ISCII_INV, 0xDA]), "का");
        assert_eq!(decode_iscii(&[0x41, 0x90]), "A\u{FFFD}");
    }
}
