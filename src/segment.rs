//! Per-page orchestration: carets → layout → glyphs.
//!
//! [`segment_page`] runs the calibration stages eagerly (their cost is a
//! handful of boundary scans) and returns a [`PageSegmentation`] whose glyph
//! sequence is lazy and one-shot. The engine is single-threaded and
//! deterministic: the same buffer and config always produce the same glyph
//! stream. Callers may process independent pages in parallel — no state is
//! shared between pages — but the per-page emission order is fixed.

use crate::buffer::PixelBuffer;
use crate::config::SegmentConfig;
use crate::error::SegmentError;
use crate::overlay::Overlay;
use crate::pipeline::carets::{locate_carets, Caret};
use crate::pipeline::layout::{calibrate, Layout};
use crate::pipeline::slice::Glyphs;
use tracing::info;

/// A calibrated page, ready to be sliced into glyphs.
pub struct PageSegmentation<'a> {
    /// The derived grid geometry.
    pub layout: Layout,
    /// Filtered caret anchors, top to bottom.
    pub carets: Vec<Caret>,
    buffer: PixelBuffer<'a>,
    intensity_shift: u8,
    overlay: Option<&'a mut dyn Overlay>,
}

impl<'a> PageSegmentation<'a> {
    /// Consume the segmentation and return the lazy glyph sequence.
    ///
    /// The sequence is finite, ordered row-major, and not restartable;
    /// clone [`PageSegmentation::layout`] first if it is needed afterwards.
    pub fn glyphs(self) -> Glyphs<'a> {
        Glyphs::new(
            self.buffer,
            self.carets,
            self.layout,
            self.intensity_shift,
            self.overlay,
        )
    }
}

/// Calibrate one page and prepare its glyph sequence.
///
/// # Errors
/// Any calibration failure (blank page, too few carets, degenerate
/// geometry) is fatal for the page; see [`SegmentError`].
pub fn segment_page<'a>(
    buffer: PixelBuffer<'a>,
    config: &SegmentConfig,
    mut overlay: Option<&'a mut dyn Overlay>,
) -> Result<PageSegmentation<'a>, SegmentError> {
    info!(
        width = buffer.width(),
        height = buffer.height(),
        "segmenting page"
    );

    // ── Step 1: Locate caret anchors ─────────────────────────────────────
    let caret_scan = locate_carets(&buffer, config, overlay.as_deref_mut())?;

    // ── Step 2: Calibrate the glyph grid ─────────────────────────────────
    let layout = calibrate(&buffer, config, &caret_scan, overlay.as_deref_mut())?;

    Ok(PageSegmentation {
        layout,
        carets: caret_scan.carets,
        buffer,
        intensity_shift: config.intensity_shift,
        overlay,
    })
}
