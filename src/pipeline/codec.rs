//! Candidate encodings with strict decoding.
//!
//! The decode chain needs decoders that *fail* on malformed input so a wrong
//! guess is rejected instead of silently producing replacement characters.
//! `encoding_rs` follows the WHATWG Encoding Standard, which is lenient in
//! ways that matter here (`latin1` is an alias of windows-1252 and undefined
//! windows-1252 bytes decode to C1 controls), so the Latin family, ASCII and
//! UTF-32 are decoded by hand and everything else is delegated.

use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fmt;

/// Labels of the default fallback order used by the decode chain.
///
/// The order is part of the observable behaviour of the chain and must not
/// change: fixtures depend on which candidate wins first.
pub const DEFAULT_FALLBACK_LABELS: [&str; 11] = [
    "utf-8",
    "utf-16",
    "utf-32",
    "iso-8859-1",
    "cp1252",
    "ascii",
    "latin1",
    "latin_1",
    "iso-8859-15",
    "windows-1252",
    "mac_roman",
];

/// Bytes that windows-1252 leaves undefined.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// A decodable character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Utf8,
    /// BOM-sniffing UTF-16; little-endian without a BOM.
    Utf16,
    Utf16Le,
    Utf16Be,
    /// BOM-sniffing UTF-32; little-endian without a BOM.
    Utf32,
    Ascii,
    /// True ISO-8859-1: byte `n` is code point `n`.
    Latin1,
    Windows1252,
    Iso8859_15,
    MacRoman,
    /// Any other encoding known to `encoding_rs` (e.g. a prober guess).
    Other(&'static Encoding),
}

impl Codec {
    /// Resolve a label as used by the prober, the CLI and the fallback list.
    ///
    /// Matching is case-insensitive and treats `_` like `-`.
    pub fn for_label(label: &str) -> Option<Codec> {
        let norm = label.trim().to_ascii_lowercase().replace('_', "-");
        let codec = match norm.as_str() {
            "utf-8" | "utf8" => Codec::Utf8,
            "utf-16" | "utf16" => Codec::Utf16,
            "utf-16le" => Codec::Utf16Le,
            "utf-16be" => Codec::Utf16Be,
            "utf-32" | "utf32" => Codec::Utf32,
            "ascii" | "us-ascii" => Codec::Ascii,
            "iso-8859-1" | "latin1" | "latin-1" | "iso8859-1" | "l1" => Codec::Latin1,
            "cp1252" | "windows-1252" => Codec::Windows1252,
            "iso-8859-15" | "latin-9" | "latin9" => Codec::Iso8859_15,
            "mac-roman" | "macroman" | "macintosh" | "x-mac-roman" => Codec::MacRoman,
            _ => Codec::Other(Encoding::for_label(norm.as_bytes())?),
        };
        Some(codec)
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Utf8 => "utf-8",
            Codec::Utf16 => "utf-16",
            Codec::Utf16Le => "utf-16le",
            Codec::Utf16Be => "utf-16be",
            Codec::Utf32 => "utf-32",
            Codec::Ascii => "ascii",
            Codec::Latin1 => "iso-8859-1",
            Codec::Windows1252 => "windows-1252",
            Codec::Iso8859_15 => "iso-8859-15",
            Codec::MacRoman => "mac-roman",
            Codec::Other(enc) => enc.name(),
        }
    }

    /// Decode `bytes`, returning `None` when they are malformed for this
    /// encoding. Never substitutes replacement characters.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Codec::Utf8 => std::str::from_utf8(without_bom(encoding_rs::UTF_8, bytes))
                .ok()
                .map(str::to_string),
            Codec::Utf16 => match bytes {
                [0xFF, 0xFE, rest @ ..] => strict(encoding_rs::UTF_16LE, rest),
                [0xFE, 0xFF, rest @ ..] => strict(encoding_rs::UTF_16BE, rest),
                _ => strict(encoding_rs::UTF_16LE, bytes),
            },
            Codec::Utf16Le => {
                strict(encoding_rs::UTF_16LE, without_bom(encoding_rs::UTF_16LE, bytes))
            }
            Codec::Utf16Be => {
                strict(encoding_rs::UTF_16BE, without_bom(encoding_rs::UTF_16BE, bytes))
            }
            Codec::Utf32 => decode_utf32(bytes),
            Codec::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| b as char).collect()),
            Codec::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            Codec::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    None
                } else {
                    strict(encoding_rs::WINDOWS_1252, bytes)
                }
            }
            Codec::Iso8859_15 => strict(encoding_rs::ISO_8859_15, bytes),
            Codec::MacRoman => strict(encoding_rs::MACINTOSH, bytes),
            Codec::Other(enc) => strict(enc, bytes),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The default fallback order, resolved.
pub fn default_fallback_codecs() -> Vec<Codec> {
    DEFAULT_FALLBACK_LABELS
        .iter()
        .filter_map(|label| Codec::for_label(label))
        .collect()
}

/// `bytes` minus a leading byte-order mark, when that mark is `encoding`'s own.
fn without_bom<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> &'a [u8] {
    match Encoding::for_bom(bytes) {
        Some((found, len)) if found == encoding => &bytes[len..],
        _ => bytes,
    }
}

fn strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

fn decode_utf32(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0xFF, 0xFE, 0x00, 0x00, rest @ ..] => (rest, false),
        [0x00, 0x00, 0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };
    if body.len() % 4 != 0 {
        return None;
    }
    body.chunks_exact(4)
        .map(|chunk| {
            let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let value = if big_endian {
                u32::from_be_bytes(raw)
            } else {
                u32::from_le_bytes(raw)
            };
            char::from_u32(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_preserved() {
        let names: Vec<&str> = default_fallback_codecs().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "utf-8",
                "utf-16",
                "utf-32",
                "iso-8859-1",
                "windows-1252",
                "ascii",
                "iso-8859-1",
                "iso-8859-1",
                "iso-8859-15",
                "windows-1252",
                "mac-roman",
            ]
        );
    }

    #[test]
    fn label_resolution() {
        assert_eq!(Codec::for_label("UTF-8"), Some(Codec::Utf8));
        assert_eq!(Codec::for_label("latin_1"), Some(Codec::Latin1));
        assert_eq!(Codec::for_label("mac_roman"), Some(Codec::MacRoman));
        assert_eq!(
            Codec::for_label("shift_jis"),
            Some(Codec::Other(encoding_rs::SHIFT_JIS))
        );
        assert_eq!(Codec::for_label("no-such-encoding"), None);
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        assert_eq!(Codec::Ascii.decode(b"plain"), Some("plain".into()));
        assert_eq!(Codec::Ascii.decode(&[b'a', 0xE9]), None);
    }

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        assert_eq!(Codec::Latin1.decode(&[0x63, 0x61, 0x66, 0xE9]), Some("café".into()));
        // 0x80 is a C1 control in ISO-8859-1, not the euro sign
        assert_eq!(Codec::Latin1.decode(&[0x80]), Some("\u{80}".into()));
    }

    #[test]
    fn cp1252_rejects_undefined_bytes() {
        assert_eq!(Codec::Windows1252.decode(&[0x80]), Some("€".into()));
        assert_eq!(Codec::Windows1252.decode(&[0x41, 0x81]), None);
    }

    #[test]
    fn utf8_is_strict() {
        assert_eq!(Codec::Utf8.decode("नमस्ते".as_bytes()), Some("नमस्ते".into()));
        assert_eq!(Codec::Utf8.decode(&[0xC3, 0x28]), None);
    }

    #[test]
    fn utf16_honours_bom() {
        assert_eq!(Codec::Utf16.decode(&[0xFF, 0xFE, b'h', 0, b'i', 0]), Some("hi".into()));
        assert_eq!(Codec::Utf16.decode(&[0xFE, 0xFF, 0, b'h', 0, b'i']), Some("hi".into()));
        assert_eq!(Codec::Utf16.decode(&[b'h', 0, b'i', 0]), Some("hi".into()));
        assert_eq!(Codec::Utf16.decode(&[b'h', 0, b'i']), None);
    }

    #[test]
    fn own_bom_is_not_part_of_the_text() {
        assert_eq!(Codec::Utf8.decode(&[0xEF, 0xBB, 0xBF, b'H', b'i']), Some("Hi".into()));
        assert_eq!(Codec::Utf16Le.decode(&[0xFF, 0xFE, b'H', 0, b'i', 0]), Some("Hi".into()));
        assert_eq!(Codec::Utf16Be.decode(&[0xFE, 0xFF, 0, b'H', 0, b'i']), Some("Hi".into()));
    }

    #[test]
    fn utf32_rejects_misaligned_and_invalid() {
        assert_eq!(Codec::Utf32.decode(&[b'A', 0, 0, 0]), Some("A".into()));
        assert_eq!(Codec::Utf32.decode(&[0, 0, 0xFE, 0xFF, 0, 0, 0, b'B']), Some("B".into()));
        assert_eq!(Codec::Utf32.decode(&[b'A', 0, 0]), None);
        assert_eq!(Codec::Utf32.decode(&[0xFF, 0xFF, 0xFF, 0x7F]), None);
    }

    #[test]
    fn mac_roman_decodes() {
        assert_eq!(Codec::MacRoman.decode(&[0x8E]), Some("é".into()));
    }
}
