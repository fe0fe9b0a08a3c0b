//! The multi-encoding decode chain: bytes in, best-effort text out.
//!
//! Candidates are tried in a fixed order and the first acceptable one wins:
//!
//! 1. legacy-script repair, when the bytes show the Devanagari misread
//! 2. the prober's guess, when its confidence is above the trust threshold
//! 3. the fallback list, accepting the first decode whose printable ratio is
//!    above the acceptance threshold
//! 4. UTF-8 with replacement characters
//!
//! Rejected candidates are logged at debug level and never surface; the
//! chain always returns a string.

use crate::config::ProcessingConfig;
use crate::error::DecodeRejection;
use crate::output::{DecodeMethod, DecodeOutcome};
use crate::pipeline::codec::Codec;
use crate::pipeline::legacy;
use crate::pipeline::printable::printable_ratio;
use crate::pipeline::probe;
use std::borrow::Cow;
use tracing::debug;

/// Decode `bytes` to text. Never fails.
pub fn decode(bytes: &[u8], config: &ProcessingConfig) -> String {
    decode_with_outcome(bytes, config).text
}

/// Decode `bytes` and report which branch of the chain produced the text.
pub fn decode_with_outcome(bytes: &[u8], config: &ProcessingConfig) -> DecodeOutcome {
    let mut working: Cow<'_, [u8]> = Cow::Borrowed(bytes);

    // ── Step 1: legacy-script repair ─────────────────────────────────────
    let view = text_view(bytes);
    if let Some(recovery) = legacy::recover(
        &view,
        config.iscii_redecode,
        config.legacy_acceptance_threshold,
    ) {
        let ratio = printable_ratio(&recovery.text);
        if ratio > config.printable_threshold {
            debug!(iscii = recovery.iscii, ratio, "legacy-script repair accepted");
            return DecodeOutcome {
                guess: probe::detect_sample(bytes, config.probe_sample_bytes),
                method: DecodeMethod::LegacyScript {
                    iscii: recovery.iscii,
                },
                text: recovery.text,
            };
        }
        debug!(
            ratio,
            threshold = config.printable_threshold,
            "legacy-script repair not printable enough; continuing with repaired text"
        );
        working = Cow::Owned(recovery.text.into_bytes());
    }

    // ── Step 2: trusted prober guess ─────────────────────────────────────
    let guess = probe::detect_sample(&working, config.probe_sample_bytes);
    if guess.confidence > config.confidence_threshold {
        match Codec::for_label(&guess.candidate_name).and_then(|c| c.decode(&working)) {
            Some(text) => {
                return DecodeOutcome {
                    text,
                    method: DecodeMethod::Probed {
                        encoding: guess.candidate_name.clone(),
                    },
                    guess,
                };
            }
            None => debug!(
                "{}",
                DecodeRejection::DecodeFailure {
                    encoding: guess.candidate_name.clone(),
                }
            ),
        }
    }

    // ── Step 3: ordered fallback list ────────────────────────────────────
    for codec in &config.fallback_encodings {
        let Some(text) = codec.decode(&working) else {
            debug!(
                "{}",
                DecodeRejection::DecodeFailure {
                    encoding: codec.name().to_string(),
                }
            );
            continue;
        };
        let ratio = printable_ratio(&text);
        if ratio > config.printable_threshold {
            return DecodeOutcome {
                text,
                method: DecodeMethod::Fallback {
                    encoding: codec.name().to_string(),
                },
                guess,
            };
        }
        debug!(
            "{}",
            DecodeRejection::LowPrintableRatio {
                encoding: codec.name().to_string(),
                ratio,
                threshold: config.printable_threshold,
            }
        );
    }

    // ── Step 4: lossy UTF-8 ──────────────────────────────────────────────
    debug!(
        candidates = config.fallback_encodings.len(),
        "no candidate accepted; decoding as lossy UTF-8"
    );
    DecodeOutcome {
        text: String::from_utf8_lossy(&working).into_owned(),
        method: DecodeMethod::LossyUtf8,
        guess,
    }
}

/// How the marker check reads raw bytes: UTF-8 when valid, otherwise
/// ISO-8859-1, the misread that produces the markers in the first place.
///
/// A byte-order mark declares a Unicode encoding, so bytes that start with
/// one are read in that encoding instead. A malformed body reads as empty.
pub fn text_view(bytes: &[u8]) -> Cow<'_, str> {
    if let Some(guess) = probe::detect_bom(bytes) {
        let text = Codec::for_label(&guess.candidate_name)
            .and_then(|codec| codec.decode(bytes))
            .unwrap_or_default();
        return Cow::Owned(text);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}
