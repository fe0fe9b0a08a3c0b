//! Encoding prober: a statistical guess of a byte buffer's encoding.
//!
//! The guess is layered from cheapest and most certain to most statistical:
//!
//! 1. empty input → `unknown`, confidence 0
//! 2. byte-order mark → that UTF flavour, confidence 1
//! 3. UTF-16 null-byte pattern without a BOM (ASCII text stored as UTF-16)
//! 4. pure ASCII → `ascii`, confidence 1
//! 5. valid UTF-8 → `utf-8`, confidence growing with the number of multibyte
//!    sequences seen (a single accented letter could be a coincidence, six
//!    are not)
//! 6. otherwise `chardetng`'s guess, scored by how printable the decode is
//!
//! Single-byte legacy guesses are capped at 0.75 × printable ratio, below the
//! default trust threshold of 0.8, so the decode chain always tries its
//! fallback list for them. That matches what statistical probers report for
//! short Latin-family samples.

use crate::output::EncodingGuess;
use crate::pipeline::printable::printable_ratio;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Candidate name used when nothing can be said about the input.
pub const UNKNOWN_ENCODING: &str = "unknown";

const UTF8_MAX_CONFIDENCE: f32 = 0.99;
const UTF8_ONE_CHAR_PROB: f32 = 0.5;
const MULTIBYTE_WEIGHT: f32 = 0.95;
const SINGLE_BYTE_WEIGHT: f32 = 0.75;

/// Guess the encoding of `bytes`. Deterministic, never fails.
pub fn detect(bytes: &[u8]) -> EncodingGuess {
    if bytes.is_empty() {
        return EncodingGuess::unknown();
    }

    if let Some(guess) = detect_bom(bytes) {
        return guess;
    }

    if let Some(guess) = detect_utf16_nulls(bytes) {
        return guess;
    }

    if bytes.is_ascii() {
        return EncodingGuess::new("ascii", 1.0);
    }

    if let Some(multibyte) = count_utf8_multibyte(bytes) {
        let confidence = if multibyte < 6 {
            1.0 - UTF8_MAX_CONFIDENCE * UTF8_ONE_CHAR_PROB.powi(multibyte as i32)
        } else {
            UTF8_MAX_CONFIDENCE
        };
        return EncodingGuess::new("utf-8", confidence.min(UTF8_MAX_CONFIDENCE));
    }

    detect_legacy(bytes)
}

/// Guess from at most the first `limit` bytes.
pub fn detect_sample(bytes: &[u8], limit: Option<usize>) -> EncodingGuess {
    match limit {
        Some(n) if n < bytes.len() => detect(&bytes[..n]),
        _ => detect(bytes),
    }
}

/// The UTF flavour declared by a leading byte-order mark, if any.
pub(crate) fn detect_bom(bytes: &[u8]) -> Option<EncodingGuess> {
    if bytes.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) || bytes.starts_with(&[0x00, 0x00, 0xFE, 0xFF])
    {
        return Some(EncodingGuess::new("utf-32", 1.0));
    }
    let (encoding, _) = Encoding::for_bom(bytes)?;
    Some(EncodingGuess::new(&encoding.name().to_ascii_lowercase(), 1.0))
}

/// ASCII text stored as UTF-16 has a zero in every other byte.
fn detect_utf16_nulls(bytes: &[u8]) -> Option<EncodingGuess> {
    if bytes.len() < 4 || bytes.len() % 2 != 0 {
        return None;
    }
    let pairs = bytes.len() / 2;
    let even_zeros = bytes.iter().step_by(2).filter(|&&b| b == 0).count();
    let odd_zeros = bytes.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();

    let (name, hits, misses) = if odd_zeros >= even_zeros {
        ("utf-16le", odd_zeros, even_zeros)
    } else {
        ("utf-16be", even_zeros, odd_zeros)
    };
    let share = hits as f32 / pairs as f32;
    if share < 0.6 || misses * 10 > pairs {
        return None;
    }
    Some(EncodingGuess::new(name, MULTIBYTE_WEIGHT * share))
}

/// Number of multibyte sequences if `bytes` is UTF-8 (a sequence cut off at
/// the very end, as happens with sampled input, still counts as valid).
fn count_utf8_multibyte(bytes: &[u8]) -> Option<usize> {
    let valid = match std::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&bytes[..e.valid_up_to()]).ok()?
        }
        Err(_) => return None,
    };
    Some(valid.chars().filter(|c| !c.is_ascii()).count())
}

fn detect_legacy(bytes: &[u8]) -> EncodingGuess {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, false);

    let (decoded, _, had_errors) = encoding.decode(bytes);
    let weight = if is_multibyte(encoding) {
        MULTIBYTE_WEIGHT
    } else {
        SINGLE_BYTE_WEIGHT
    };
    let mut confidence = printable_ratio(&decoded) * weight;
    if had_errors {
        confidence *= 0.5;
    }
    EncodingGuess::new(&encoding.name().to_ascii_lowercase(), confidence)
}

fn is_multibyte(encoding: &'static Encoding) -> bool {
    [
        encoding_rs::SHIFT_JIS,
        encoding_rs::EUC_JP,
        encoding_rs::ISO_2022_JP,
        encoding_rs::EUC_KR,
        encoding_rs::GBK,
        encoding_rs::GB18030,
        encoding_rs::BIG5,
    ]
    .contains(&encoding)
}
