//! Pipeline stages for text recovery.
//!
//! Each submodule implements one transformation step and is testable on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ decode ──────────────────▶ normalize ──▶ llm (optional)
//! (URL/path) (pdfium/   │ legacy → probe →            (clean)     (translate)
//!             dump)     │ fallback → lossy
//!                       └ codec, printable
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to a local file
//! 2. [`extract`]   — one [`crate::output::RawPage`] per page; pdfium runs in
//!    `spawn_blocking`
//! 3. [`decode`]    — the ordered decode chain, built on [`legacy`], [`probe`],
//!    [`codec`] and [`printable`]
//! 4. [`normalize`] — whitespace policy, mis-encoding artifact fixes, generic
//!    cleaner
//! 5. [`llm`]       — the model capability; the only stage with network I/O
//!
//! Output-side helpers: [`postprocess`] cleans model-written Markdown and
//! flattens it for the PDF exporter; [`sanitize`] maps text into the 8-bit
//! range the PDF font can draw.

pub mod codec;
pub mod decode;
pub mod extract;
pub mod input;
pub mod legacy;
pub mod llm;
pub mod normalize;
pub mod postprocess;
pub mod printable;
pub mod probe;
pub mod sanitize;
