//! Payload reassembly: transcriptions → base64 stream → document bytes.
//!
//! Pages are transcribed independently and concatenated in page order. The
//! resulting stream usually carries junk at both ends — cover-page noise
//! before the payload and trailer noise after it — so callers supply the
//! known first and last base64 lines of the document as markers. The stream
//! is trimmed to `[start, end]`, then `==` padding is re-appended: padding
//! characters only ever occur at the very end of a document, so they never
//! appear in classifier training data and must be restored by hand.
//!
//! Decoding is forgiving about padding for the same reason — a recovered
//! stream's length rarely lands on a 4-character boundary until the manual
//! `==` is accounted for.

use crate::error::SegmentError;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine as _};
use tracing::debug;

/// Standard-alphabet engine that accepts both padded and unpadded input.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Known first and last base64 lines of the payload, used to trim
/// transcription noise.
#[derive(Debug, Clone)]
pub struct PayloadMarkers {
    pub start: String,
    pub end: String,
}

/// Trim a concatenated transcription to the payload between the markers and
/// restore the trailing `==` padding.
pub fn trim_to_markers(text: &str, markers: &PayloadMarkers) -> Result<String, SegmentError> {
    let start = text
        .find(&markers.start)
        .ok_or_else(|| SegmentError::MarkerNotFound {
            which: "start",
            marker: markers.start.clone(),
        })?;
    let end = text[start..]
        .find(&markers.end)
        .map(|i| start + i)
        .ok_or_else(|| SegmentError::MarkerNotFound {
            which: "end",
            marker: markers.end.clone(),
        })?;

    debug!(start, end, total = text.len(), "payload trimmed to markers");
    Ok(format!("{}{}==", &text[start..end], markers.end))
}

/// Decode a recovered base64 stream into the payload bytes.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, SegmentError> {
    Ok(FORGIVING.decode(text.trim_end_matches('='))?)
}
