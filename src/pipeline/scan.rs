//! Boundary scanning: the single primitive under all calibration.
//!
//! A scan walks along one axis, one coordinate at a time, classifying the
//! perpendicular line segment at each position as blank or inked under a
//! cutoff, and stops at the first position whose classification matches the
//! request. Every geometric question the calibrator asks — "first inked
//! column from the left", "first blank gap above this caret", "bottom edge of
//! the payload block" — is this one routine with different parameters.
//!
//! The axis is a two-value enum and the direction a signed unit step, so
//! both orientations share one loop and invalid axis values are
//! unrepresentable.

use crate::buffer::PixelBuffer;

/// Which coordinate a scan advances along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Advance along x, classifying vertical line segments (columns).
    Column,
    /// Advance along y, classifying horizontal line segments (rows).
    Row,
}

impl Axis {
    /// Extent of the buffer along this axis.
    pub fn extent(self, buffer: &PixelBuffer<'_>) -> i32 {
        match self {
            Axis::Column => buffer.width() as i32,
            Axis::Row => buffer.height() as i32,
        }
    }
}

/// Scan direction along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Find the first coordinate along `axis`, starting at `start` and moving in
/// `direction`, whose perpendicular segment `[range_lo, range_hi)` matches
/// `want_blank`.
///
/// A segment is blank iff every in-range pixel has R, G, and B all at or
/// above `cutoff`; samples outside the buffer count as blank. When the scan
/// runs off the buffer without a match it returns the first out-of-range
/// coordinate (−1 or the axis extent) — callers interpret that as "not
/// found" from context, and several of them rely on the exact value for
/// their off-by-one arithmetic.
///
/// Callers must pass a non-empty sample range (`range_lo < range_hi`).
pub fn scan(
    buffer: &PixelBuffer<'_>,
    mut start: i32,
    range_lo: i32,
    range_hi: i32,
    axis: Axis,
    direction: Direction,
    want_blank: bool,
    cutoff: u8,
) -> i32 {
    debug_assert!(range_lo < range_hi, "empty scan range");
    let step = direction.step();
    let extent = axis.extent(buffer);
    loop {
        if (step > 0 && start >= extent) || (step < 0 && start < 0) {
            break;
        }
        if segment_is_blank(buffer, start, range_lo, range_hi, axis, cutoff) == want_blank {
            break;
        }
        start += step;
    }
    start
}

/// Classify one perpendicular segment at `pos`.
fn segment_is_blank(
    buffer: &PixelBuffer<'_>,
    pos: i32,
    range_lo: i32,
    range_hi: i32,
    axis: Axis,
    cutoff: u8,
) -> bool {
    for i in range_lo..range_hi {
        let sample = match axis {
            Axis::Column => buffer.rgb(pos, i),
            Axis::Row => buffer.rgb(i, pos),
        };
        if let Some((r, g, b)) = sample {
            if r < cutoff || g < cutoff || b < cutoff {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White page with a black rectangle.
    fn page_with_rect(w: u32, h: u32, rx: u32, ry: u32, rw: u32, rh: u32) -> Vec<u8> {
        let mut data = vec![255u8; (w * h * 4) as usize];
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                let idx = ((y * w + x) * 4) as usize;
                data[idx] = 0;
                data[idx + 1] = 0;
                data[idx + 2] = 0;
            }
        }
        data
    }

    #[test]
    fn finds_first_inked_column() {
        let data = page_with_rect(100, 50, 30, 10, 5, 5);
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        let x = scan(&buf, 0, 0, 50, Axis::Column, Direction::Forward, false, 254);
        assert_eq!(x, 30);
    }

    #[test]
    fn finds_first_blank_gap_after_ink() {
        let data = page_with_rect(100, 50, 30, 10, 5, 5);
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        let x = scan(&buf, 30, 0, 50, Axis::Column, Direction::Forward, true, 254);
        assert_eq!(x, 35);
    }

    #[test]
    fn finds_inked_row_scanning_up() {
        let data = page_with_rect(100, 50, 30, 10, 5, 5);
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        let y = scan(&buf, 49, 30, 35, Axis::Row, Direction::Backward, false, 254);
        assert_eq!(y, 14);
    }

    #[test]
    fn runs_off_forward_edge_when_nothing_matches() {
        let data = vec![255u8; 100 * 50 * 4];
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        let x = scan(&buf, 0, 0, 50, Axis::Column, Direction::Forward, false, 254);
        assert_eq!(x, 100);
    }

    #[test]
    fn runs_off_backward_edge_when_nothing_matches() {
        let data = vec![255u8; 100 * 50 * 4];
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        let y = scan(&buf, 49, 0, 100, Axis::Row, Direction::Backward, false, 254);
        assert_eq!(y, -1);
    }

    #[test]
    fn matching_start_returns_immediately() {
        let data = page_with_rect(100, 50, 30, 10, 5, 5);
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        let x = scan(&buf, 32, 0, 50, Axis::Column, Direction::Forward, false, 254);
        assert_eq!(x, 32);
    }

    /// Scanning for blank, then for non-blank from the result, never moves
    /// backward relative to the direction (except at edges).
    #[test]
    fn blank_then_ink_is_monotone() {
        let data = page_with_rect(100, 50, 30, 10, 5, 5);
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        for start in 0..100 {
            let blank = scan(&buf, start, 0, 50, Axis::Column, Direction::Forward, true, 254);
            if blank >= 100 {
                continue;
            }
            let inked = scan(&buf, blank, 0, 50, Axis::Column, Direction::Forward, false, 254);
            assert!(inked >= blank, "start {start}: {inked} < {blank}");
        }
    }

    #[test]
    fn out_of_range_samples_count_as_blank() {
        let data = page_with_rect(100, 50, 30, 10, 5, 5);
        let buf = PixelBuffer::new(100, 50, &data).expect("valid buffer");
        // Sample range extends past both vertical edges; the rect must still
        // be found.
        let x = scan(&buf, 0, -10, 80, Axis::Column, Direction::Forward, false, 254);
        assert_eq!(x, 30);
    }
}
