//! Caret location: find the vertical anchor marks that start each payload row.
//!
//! Nothing about the page layout is known up front. The locator bootstraps
//! itself from pixel content alone:
//!
//! 1. The caret column is the first inked column from the left over the full
//!    page height.
//! 2. The caret width is estimated from the page scale, then measured exactly
//!    on the first caret found.
//! 3. The lowest caret is found by scanning rows bottom-up inside the caret
//!    column band; the walk then repeats upward, one estimated line at a
//!    time, refining each caret's left edge.
//! 4. Header or title content above the payload block can masquerade as caret
//!    rows. A second band immediately right of the carets is scanned upward
//!    for the bottom edge of any non-caret ink; every caret above that
//!    boundary is discarded.
//!
//! The `-1` after left-edge scans, the `+1` after the non-caret-bottom scan,
//! and the `- caret_height` step of the upward walk are load-bearing:
//! downstream column arithmetic is tuned to these exact values.

use crate::buffer::PixelBuffer;
use crate::config::SegmentConfig;
use crate::error::SegmentError;
use crate::overlay::{self, Overlay};
use crate::pipeline::scan::{scan, Axis, Direction};
use serde::Serialize;
use tracing::{debug, info};

/// One detected row-anchor mark.
#[derive(Debug, Clone, Serialize)]
pub struct Caret {
    /// Exact left edge of the caret ink.
    pub x: i32,
    /// First blank row above the caret ink (the row the walk anchored on).
    pub y: i32,
    /// Caret ink height, shared by every caret on the page.
    pub height: i32,
    /// Half the caret height, kept fractional for midline drawing.
    pub half_height: f64,
}

/// Result of caret location, consumed by layout calibration.
#[derive(Debug, Clone)]
pub struct CaretScan {
    /// Carets ordered top-to-bottom by ascending `y`, header rows filtered.
    pub carets: Vec<Caret>,
    /// Measured caret ink width.
    pub caret_width: i32,
    /// Measured caret ink height.
    pub caret_height: i32,
    /// Bottom edge of any non-caret content above the payload block.
    /// Rows above this boundary were discarded as header matches.
    pub non_caret_bottom: i32,
}

/// Locate the payload row anchors on one page.
///
/// Fails with a calibration error when the page holds no ink column at all
/// or fewer than 2 carets survive the header filter — callers must not
/// proceed with degenerate geometry.
pub fn locate_carets(
    buffer: &PixelBuffer<'_>,
    config: &SegmentConfig,
    mut overlay: Option<&mut (dyn Overlay + '_)>,
) -> Result<CaretScan, SegmentError> {
    let width = buffer.width() as i32;
    let height = buffer.height() as i32;
    let cutoff = config.caret_cutoff;
    let scale = config.scale_for(buffer.height());

    // First inked column over the full page height seeds the caret band.
    let first_inked = scan(
        buffer,
        0,
        0,
        height,
        Axis::Column,
        Direction::Forward,
        false,
        cutoff,
    );
    if first_inked >= width {
        return Err(SegmentError::NoCaretColumn {
            width: buffer.width(),
            height: buffer.height(),
            cutoff,
        });
    }
    let caret_x_estimate = first_inked - 1;
    let caret_width_estimate = (config.reference_caret_width * scale).round() as i32 - 1;
    debug!(
        caret_x_estimate,
        caret_width_estimate, scale, "caret column seeded"
    );

    // Bottom of the lowest caret, then its top, give the caret height.
    let caret_bottom = scan(
        buffer,
        height - 1,
        caret_x_estimate,
        caret_x_estimate + caret_width_estimate,
        Axis::Row,
        Direction::Backward,
        false,
        cutoff,
    );
    let mut caret_y = scan(
        buffer,
        caret_bottom,
        caret_x_estimate,
        caret_x_estimate + caret_width_estimate,
        Axis::Row,
        Direction::Backward,
        true,
        cutoff,
    );
    let caret_height = caret_bottom - caret_y;

    // Walk upward, at most max_rows times, refining each caret's left edge.
    // The exact width is measured once, on the first (lowest) caret.
    let mut caret_width: Option<i32> = None;
    let mut carets: Vec<Caret> = Vec::new();
    for _ in 0..config.max_rows {
        if caret_y <= 0 {
            continue;
        }

        let x = scan(
            buffer,
            caret_x_estimate,
            caret_y,
            caret_y + caret_height,
            Axis::Column,
            Direction::Forward,
            false,
            cutoff,
        ) - 1;

        let measured_width = match caret_width {
            Some(w) => w,
            None => {
                let w = scan(
                    buffer,
                    x + 1,
                    caret_y,
                    caret_y + caret_height,
                    Axis::Column,
                    Direction::Forward,
                    true,
                    cutoff,
                ) - x
                    - 1;
                caret_width = Some(w);
                w
            }
        };

        carets.push(Caret {
            x,
            y: caret_y,
            height: caret_height,
            half_height: caret_height as f64 / 2.0,
        });

        caret_y = scan(
            buffer,
            caret_y,
            caret_x_estimate,
            caret_x_estimate + measured_width,
            Axis::Row,
            Direction::Backward,
            false,
            cutoff,
        ) - caret_height;
    }

    // The walk collected bottom-to-top; readers want top-to-bottom.
    carets.reverse();

    if carets.is_empty() {
        return Err(SegmentError::TooFewCarets { found: 0 });
    }
    let caret_width = caret_width.unwrap_or(caret_width_estimate);

    // Header filter: scan the band just right of the carets upward for the
    // bottom edge of non-caret content, then discard carets above it.
    let search_start_x = carets[0].x + caret_width + 3;
    let search_stop_x = carets[0].x + caret_width * 2 - 1;
    let last_y = carets[carets.len() - 1].y;
    let non_caret_bottom = scan(
        buffer,
        last_y,
        search_start_x,
        search_stop_x,
        Axis::Row,
        Direction::Backward,
        false,
        cutoff,
    ) + 1;
    let before = carets.len();
    while carets.first().is_some_and(|c| c.y < non_caret_bottom) {
        carets.remove(0);
    }
    if before != carets.len() {
        debug!(
            dropped = before - carets.len(),
            non_caret_bottom, "header rows filtered"
        );
    }

    if carets.len() < 2 {
        return Err(SegmentError::TooFewCarets {
            found: carets.len(),
        });
    }

    for caret in &carets {
        overlay::line(&mut overlay, caret.x, caret.y, caret.x + caret_width, caret.y);
        overlay::line(&mut overlay, caret.x, caret.y, caret.x, caret.y + caret_height);
        let mid = caret.y + caret.half_height.round() as i32;
        overlay::line(&mut overlay, caret.x, mid, caret.x + caret_width, mid);
    }
    overlay::line(
        &mut overlay,
        search_start_x,
        non_caret_bottom,
        search_stop_x,
        non_caret_bottom,
    );

    info!(
        carets = carets.len(),
        caret_width, caret_height, "carets located"
    );

    Ok(CaretScan {
        carets,
        caret_width,
        caret_height,
        non_caret_bottom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testpage::TestPage;

    #[test]
    fn locates_evenly_spaced_carets() {
        let mut page = TestPage::blank(2000, 3375);
        // Ten carets, bottom-most top edge at y=3000, spaced 47 px upward.
        for k in 0..10 {
            page.fill_rect(51, 3000 - 47 * k, 24, 20);
        }
        let buf = page.buffer();
        let scan = locate_carets(&buf, &SegmentConfig::default(), None).expect("carets");

        assert_eq!(scan.carets.len(), 10);
        assert_eq!(scan.caret_width, 24);
        assert_eq!(scan.caret_height, 20);
        // Each anchor is the blank row above the caret's ink.
        assert_eq!(scan.carets[0].y, 3000 - 47 * 9 - 1);
        assert_eq!(scan.carets[9].y, 2999);
        for pair in scan.carets.windows(2) {
            assert!(pair[0].y < pair[1].y, "carets not strictly ascending");
            assert_eq!(pair[1].y - pair[0].y, 47);
        }
        assert_eq!(scan.carets[0].x, 50);
    }

    #[test]
    fn blank_page_is_a_calibration_failure() {
        let page = TestPage::blank(800, 1200);
        let buf = page.buffer();
        let err = locate_carets(&buf, &SegmentConfig::default(), None);
        assert!(matches!(err, Err(SegmentError::NoCaretColumn { .. })));
    }

    #[test]
    fn single_caret_is_too_few() {
        let mut page = TestPage::blank(2000, 3375);
        page.fill_rect(51, 3000, 24, 20);
        let buf = page.buffer();
        let err = locate_carets(&buf, &SegmentConfig::default(), None);
        assert!(matches!(err, Err(SegmentError::TooFewCarets { found: 1 })));
    }

    #[test]
    fn header_rows_above_non_caret_content_are_dropped() {
        let mut page = TestPage::blank(2000, 3375);
        for k in 0..10 {
            page.fill_rect(51, 3000 - 47 * k, 24, 20);
        }
        // A title mark in the caret column above the payload block, plus
        // header ink in the filter band below it.
        page.fill_rect(51, 2400, 24, 20);
        page.fill_rect(77, 2450, 220, 20);

        let buf = page.buffer();
        let scan = locate_carets(&buf, &SegmentConfig::default(), None).expect("carets");

        // The spurious mark at y=2399 sits above the non-caret bottom (2470)
        // and must be gone; the ten genuine carets survive.
        assert_eq!(scan.non_caret_bottom, 2470);
        assert_eq!(scan.carets.len(), 10);
        assert_eq!(scan.carets[0].y, 3000 - 47 * 9 - 1);
    }

    #[test]
    fn walk_is_capped_at_max_rows() {
        let mut page = TestPage::blank(2000, 3375);
        for k in 0..30 {
            page.fill_rect(51, 3000 - 47 * k, 24, 20);
        }
        let config = SegmentConfig::builder().max_rows(5).build().expect("config");
        let buf = page.buffer();
        let scan = locate_carets(&buf, &config, None).expect("carets");
        assert_eq!(scan.carets.len(), 5);
    }
}
