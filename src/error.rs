//! Error types for the glyphgrid library.
//!
//! The taxonomy mirrors the two ways a page can defeat the engine:
//!
//! * **Calibration failures** — the page content never yielded usable
//!   geometry (no ink column, too few carets, degenerate line height or
//!   column width). These are fatal for the page: the engine refuses to
//!   produce NaN or garbage geometry and surfaces a typed error instead.
//!
//! * **[`SegmentError::OutOfBounds`]** — calibration produced a layout, but a
//!   computed glyph cell would read outside the pixel buffer. This indicates
//!   calibration drift and is reported rather than silently clamped, since a
//!   clamped cell would feed a mis-cropped bitmap to the classifier.
//!
//! The engine is deterministic, so nothing here is retried internally.
//! Callers that suspect a bad scale estimate can re-run with a different
//! [`crate::SegmentConfig`]; that policy lives outside the engine.

use thiserror::Error;

/// All errors returned by the glyphgrid library.
#[derive(Debug, Error)]
pub enum SegmentError {
    // ── Calibration failures ──────────────────────────────────────────────
    /// No column of the page contains any ink under the caret cutoff.
    #[error(
        "No caret column found: no pixel column of the {width}x{height} page \
         contains ink below cutoff {cutoff}.\n\
         The page is blank or the payload block is missing."
    )]
    NoCaretColumn { width: u32, height: u32, cutoff: u8 },

    /// Fewer than 2 carets survived the header filter.
    #[error(
        "Only {found} caret(s) located (need at least 2 to derive line spacing).\n\
         Either the page holds no payload rows or the header filter removed \
         genuine carets — check the caret cutoff and reference page height."
    )]
    TooFewCarets { found: usize },

    /// Mean caret spacing came out non-positive.
    #[error(
        "Derived line height {value} is not positive.\n\
         Caret detection matched overlapping or duplicate rows."
    )]
    NonPositiveLineHeight { value: f64 },

    /// The payload block's horizontal bounds collapsed.
    #[error(
        "Derived column width {value} is not positive (block left {left}, right {right}).\n\
         The payload block edges were not found; the left/right edge cutoffs \
         may not match this rendering."
    )]
    NonPositiveColumnWidth { value: f64, left: i32, right: i32 },

    /// The payload block's vertical bounds collapsed.
    #[error("Payload block vertical bounds are degenerate (top {top}, bottom {bottom}).")]
    DegenerateBlockBounds { top: i32, bottom: i32 },

    /// Glyph cell height came out non-positive.
    #[error(
        "Derived glyph cell height {value} is not positive \
         (line height {line_height}, padding {padding}).\n\
         The line padding reference is too large for this page scale."
    )]
    NonPositiveCellHeight {
        value: i32,
        line_height: f64,
        padding: f64,
    },

    // ── Slicing errors ────────────────────────────────────────────────────
    /// A computed glyph cell would read outside the pixel buffer.
    ///
    /// Never clamped: an out-of-range cell means calibration drifted and
    /// every later cell in the row would be mis-cropped.
    #[error(
        "Glyph cell at row {row}, col {col} ({x},{y} {cell_width}x{cell_height}) \
         exceeds the {width}x{height} page buffer"
    )]
    OutOfBounds {
        row: usize,
        col: usize,
        x: i32,
        y: i32,
        cell_width: u32,
        cell_height: u32,
        width: u32,
        height: u32,
    },

    // ── Buffer errors ─────────────────────────────────────────────────────
    /// The supplied byte slice does not match width × height × 4.
    #[error("RGBA buffer size mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    // ── Payload assembly errors ───────────────────────────────────────────
    /// A configured start/end marker line was not found in the transcription.
    #[error(
        "Payload marker not found in transcription: '{marker}'\n\
         The classifier output does not contain the expected {which} line; \
         the markers belong to a different document or classification failed."
    )]
    MarkerNotFound { which: &'static str, marker: String },

    /// The assembled text is not valid base64.
    #[error("Recovered payload is not valid base64: {0}")]
    PayloadDecode(#[from] base64::DecodeError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
