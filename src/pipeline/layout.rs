//! Layout calibration: derive the page's glyph grid from the caret anchors.
//!
//! Line spacing is the mean of consecutive caret deltas. The payload block's
//! bounds are found by scanning outward from caret-relative seed points, with
//! deliberately asymmetric cutoffs: the caret band uses the strict near-white
//! cutoff, while the block's left and right edges use looser ones because
//! glyph ink is anti-aliased and lighter than caret ink. The column width
//! then follows from the fixed 76-column wrap convention — it is never
//! detected from the image.
//!
//! Every derived quantity is validated before a [`Layout`] is produced;
//! degenerate geometry surfaces as a typed calibration error, never as NaN.

use crate::buffer::PixelBuffer;
use crate::config::SegmentConfig;
use crate::error::SegmentError;
use crate::overlay::{self, Overlay};
use crate::pipeline::carets::CaretScan;
use crate::pipeline::scan::{scan, Axis, Direction};
use serde::Serialize;
use tracing::{debug, info};

/// Payload text is wrapped at 76 columns — a property of the encoding
/// convention, fixed for every page.
pub const PAYLOAD_COLUMNS: usize = 76;

/// Immutable per-page grid geometry, computed once and consumed by slicing.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    /// Measured caret ink width.
    pub caret_width: i32,
    /// Measured caret ink height.
    pub caret_height: i32,
    /// Mean vertical distance between consecutive carets.
    pub line_height: f64,
    /// Payload block bounds in page pixels.
    pub base64_left: i32,
    pub base64_right: i32,
    pub base64_top: i32,
    pub base64_bottom: i32,
    /// Fractional width of one glyph column.
    pub column_width: f64,
    /// Always [`PAYLOAD_COLUMNS`].
    pub column_count: usize,
    /// Glyph cell height: `ceil(line_height − scaled line padding)`.
    pub cell_height: i32,
    /// Scaled offset from a caret's `y` up to the top of its glyph cells.
    pub glyph_y_offset: i32,
}

/// Calibrate the glyph grid from located carets.
pub fn calibrate(
    buffer: &PixelBuffer<'_>,
    config: &SegmentConfig,
    caret_scan: &CaretScan,
    mut overlay: Option<&mut (dyn Overlay + '_)>,
) -> Result<Layout, SegmentError> {
    let carets = &caret_scan.carets;
    debug_assert!(carets.len() >= 2, "caret location guarantees >= 2 carets");

    let width = buffer.width() as i32;
    let height = buffer.height() as i32;
    let caret_width = caret_scan.caret_width;
    let cutoff = config.caret_cutoff;
    let scale = config.scale_for(buffer.height());

    let total_delta: i32 = carets
        .windows(2)
        .map(|pair| pair[1].y - pair[0].y)
        .sum();
    let line_height = total_delta as f64 / (carets.len() - 1) as f64;
    if !(line_height > 0.0) {
        return Err(SegmentError::NonPositiveLineHeight { value: line_height });
    }

    // Coarse horizontal extent of the block under the strict cutoff. The
    // left seed starts just right of the caret band and samples only below
    // the non-caret bottom so header content cannot capture the edge.
    let first = &carets[0];
    let last = &carets[carets.len() - 1];
    let left_estimate = scan(
        buffer,
        first.x + caret_width + 2,
        caret_scan.non_caret_bottom,
        height,
        Axis::Column,
        Direction::Forward,
        false,
        cutoff,
    );
    let right_estimate = scan(
        buffer,
        width - 1,
        0,
        height,
        Axis::Column,
        Direction::Backward,
        false,
        cutoff,
    );
    if left_estimate >= right_estimate {
        return Err(SegmentError::NonPositiveColumnWidth {
            value: 0.0,
            left: left_estimate,
            right: right_estimate,
        });
    }

    // Vertical bounds: first blank rows above the top caret and below the
    // bottom caret, sampled across the estimated block.
    let base64_top = scan(
        buffer,
        first.y,
        left_estimate,
        right_estimate,
        Axis::Row,
        Direction::Backward,
        true,
        cutoff,
    );
    let base64_bottom = scan(
        buffer,
        last.y,
        left_estimate,
        right_estimate,
        Axis::Row,
        Direction::Forward,
        true,
        cutoff,
    );
    if base64_bottom <= base64_top {
        return Err(SegmentError::DegenerateBlockBounds {
            top: base64_top,
            bottom: base64_bottom,
        });
    }

    // Exact horizontal edges under the looser glyph-ink cutoffs.
    let base64_left = scan(
        buffer,
        first.x + caret_width + 1,
        base64_top,
        base64_bottom,
        Axis::Column,
        Direction::Forward,
        false,
        config.left_cutoff,
    );
    let base64_right = scan(
        buffer,
        width - 1,
        base64_top,
        base64_bottom,
        Axis::Column,
        Direction::Backward,
        false,
        config.right_cutoff,
    );

    let column_width = (base64_right - base64_left + 1) as f64 / PAYLOAD_COLUMNS as f64;
    if !(column_width > 0.0) {
        return Err(SegmentError::NonPositiveColumnWidth {
            value: column_width,
            left: base64_left,
            right: base64_right,
        });
    }

    let line_padding = config.reference_line_padding * scale;
    let cell_height = (line_height - line_padding).ceil() as i32;
    if cell_height <= 0 {
        return Err(SegmentError::NonPositiveCellHeight {
            value: cell_height,
            line_height,
            padding: line_padding,
        });
    }
    let glyph_y_offset = (config.reference_glyph_y_offset * scale).round() as i32;

    overlay::line(&mut overlay, 0, base64_top, width, base64_top);
    overlay::line(&mut overlay, 0, base64_bottom, width, base64_bottom);
    overlay::line(&mut overlay, base64_left, 0, base64_left, height);
    overlay::line(&mut overlay, base64_right, 0, base64_right, height);

    debug!(
        left_estimate,
        right_estimate, base64_top, base64_bottom, "block bounds scanned"
    );
    info!(
        line_height,
        column_width, base64_left, base64_right, cell_height, "layout calibrated"
    );

    Ok(Layout {
        caret_width,
        caret_height: caret_scan.caret_height,
        line_height,
        base64_left,
        base64_right,
        base64_top,
        base64_bottom,
        column_width,
        column_count: PAYLOAD_COLUMNS,
        cell_height,
        glyph_y_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::carets::locate_carets;
    use crate::pipeline::testpage::TestPage;

    /// Ten caret rows plus a full glyph block: carets at x=51 (width 24),
    /// glyph ink spanning x 100..=1923 so the column width is exactly 24.
    fn calibrated_page() -> TestPage {
        let mut page = TestPage::blank(2000, 3375);
        for k in 0..10 {
            let top = 3000 - 47 * k;
            page.fill_rect(51, top, 24, 20);
            // One full-width ink row per glyph row, flush with both edges.
            page.fill_rect(100, top + 3, 1824, 1);
        }
        page
    }

    #[test]
    fn derives_line_height_and_column_width() {
        let page = calibrated_page();
        let buf = page.buffer();
        let config = SegmentConfig::default();
        let carets = locate_carets(&buf, &config, None).expect("carets");
        let layout = calibrate(&buf, &config, &carets, None).expect("layout");

        assert_eq!(layout.line_height, 47.0);
        assert_eq!(layout.base64_left, 100);
        assert_eq!(layout.base64_right, 1923);
        assert_eq!(layout.column_width, 24.0);
        assert_eq!(layout.column_count, PAYLOAD_COLUMNS);
        // scale = 1 → cell height = ceil(47 − 4), glyph offset = 6.
        assert_eq!(layout.cell_height, 43);
        assert_eq!(layout.glyph_y_offset, 6);
        assert!(layout.base64_bottom > layout.base64_top);
    }

    #[test]
    fn carets_without_glyph_block_fail_calibration() {
        let mut page = TestPage::blank(2000, 3375);
        for k in 0..10 {
            page.fill_rect(51, 3000 - 47 * k, 24, 20);
        }
        let buf = page.buffer();
        let config = SegmentConfig::default();
        let carets = locate_carets(&buf, &config, None).expect("carets");
        let err = calibrate(&buf, &config, &carets, None);
        assert!(matches!(
            err,
            Err(SegmentError::NonPositiveColumnWidth { .. })
        ));
    }

    #[test]
    fn layout_invariants_hold() {
        let page = calibrated_page();
        let buf = page.buffer();
        let config = SegmentConfig::default();
        let carets = locate_carets(&buf, &config, None).expect("carets");
        let layout = calibrate(&buf, &config, &carets, None).expect("layout");

        assert!(layout.line_height > 0.0);
        assert!(layout.column_width > 0.0);
        assert!(layout.base64_right > layout.base64_left);
        assert!(layout.base64_bottom > layout.base64_top);
        assert!(layout.cell_height > 0);
    }
}
