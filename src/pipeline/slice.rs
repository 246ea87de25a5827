//! Glyph slicing: walk the calibrated grid and yield one bitmap per cell.
//!
//! Glyphs are produced lazily, strictly in row-major order — row 0 col 0..75,
//! row 1 col 0..75, … — which is the reading order of the encoded payload.
//! Reordering the emission would scramble the reconstructed document.
//!
//! The horizontal position accumulates by repeatedly adding the fractional
//! column width to a running float, seeded at the block's left edge, instead
//! of recomputing `left + col · width` per cell; accumulation keeps rounding
//! error from being reintroduced at every step, and the position is rounded
//! to a pixel only at extraction time. Cells whose every derived intensity is
//! 255 are dropped — they are the unused trailing cells on wrap boundaries
//! and the final partial row, and never part of the payload.

use crate::buffer::PixelBuffer;
use crate::error::SegmentError;
use crate::overlay::{self, Overlay};
use crate::pipeline::carets::Caret;
use crate::pipeline::layout::Layout;

/// One glyph cell's pixel intensities.
///
/// `intensity` is single-channel, row-major, derived from the red channel
/// right-shifted by the configured bit count.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Caret row index, top to bottom.
    pub row: usize,
    /// Column index within the 76-column grid.
    pub col: usize,
    pub width: u32,
    pub height: u32,
    pub intensity: Vec<u8>,
}

/// Lazy, ordered, one-shot glyph sequence for a single page.
///
/// Yields `Err` for cells whose computed bounds leave the pixel buffer —
/// a sign of calibration drift — and silently skips blank cells.
pub struct Glyphs<'a> {
    buffer: PixelBuffer<'a>,
    carets: Vec<Caret>,
    layout: Layout,
    shift: u8,
    overlay: Option<&'a mut dyn Overlay>,
    row: usize,
    col: usize,
    x: f64,
    y: i32,
}

impl<'a> Glyphs<'a> {
    pub(crate) fn new(
        buffer: PixelBuffer<'a>,
        carets: Vec<Caret>,
        layout: Layout,
        shift: u8,
        overlay: Option<&'a mut dyn Overlay>,
    ) -> Self {
        let x = layout.base64_left as f64;
        let y = carets
            .first()
            .map(|c| c.y - layout.glyph_y_offset)
            .unwrap_or(0);
        Self {
            buffer,
            carets,
            layout,
            shift,
            overlay,
            row: 0,
            col: 0,
            x,
            y,
        }
    }

    /// The layout this iterator slices against.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Reseed the running position at the start of a caret row.
    fn seed_row(&mut self) {
        self.x = self.layout.base64_left as f64;
        self.y = self.carets[self.row].y - self.layout.glyph_y_offset;
    }
}

impl<'a> Iterator for Glyphs<'a> {
    type Item = Result<Glyph, SegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        let cell_width = self.layout.column_width.ceil() as i32;
        let cell_height = self.layout.cell_height;

        loop {
            if self.row >= self.carets.len() {
                return None;
            }
            if self.col >= self.layout.column_count {
                self.row += 1;
                self.col = 0;
                if self.row < self.carets.len() {
                    self.seed_row();
                }
                continue;
            }

            let (row, col) = (self.row, self.col);
            let x = self.x.round() as i32;
            let y = self.y;
            self.col += 1;
            self.x += self.layout.column_width;

            if x < 0
                || y < 0
                || x + cell_width > self.buffer.width() as i32
                || y + cell_height > self.buffer.height() as i32
            {
                return Some(Err(SegmentError::OutOfBounds {
                    row,
                    col,
                    x,
                    y,
                    cell_width: cell_width as u32,
                    cell_height: cell_height as u32,
                    width: self.buffer.width(),
                    height: self.buffer.height(),
                }));
            }

            let rgba = self.buffer.copy_rect(
                x as u32,
                y as u32,
                cell_width as u32,
                cell_height as u32,
            );
            let intensity: Vec<u8> = rgba
                .chunks_exact(4)
                .map(|px| px[0] >> self.shift)
                .collect();

            if intensity.iter().all(|&v| v == 255) {
                continue;
            }

            overlay::line(&mut self.overlay, x, y, x, y + cell_height);
            overlay::line(&mut self.overlay, x, y, x + cell_width, y);
            overlay::line(
                &mut self.overlay,
                x,
                y + cell_height,
                x + cell_width,
                y + cell_height,
            );

            return Some(Ok(Glyph {
                row,
                col,
                width: cell_width as u32,
                height: cell_height as u32,
                intensity,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::PAYLOAD_COLUMNS;
    use crate::pipeline::testpage::TestPage;

    fn grid_layout() -> Layout {
        Layout {
            caret_width: 24,
            caret_height: 20,
            line_height: 47.0,
            base64_left: 100,
            base64_right: 1923,
            base64_top: 0,
            base64_bottom: 3375,
            column_width: 24.0,
            column_count: PAYLOAD_COLUMNS,
            cell_height: 43,
            glyph_y_offset: 6,
        }
    }

    fn caret(y: i32) -> Caret {
        Caret {
            x: 50,
            y,
            height: 20,
            half_height: 10.0,
        }
    }

    #[test]
    fn emits_row_major_and_drops_blank_cells() {
        let mut page = TestPage::blank(2000, 3375);
        // Row 0: ink in cols 0, 2, 75. Row 1: ink in col 1 only.
        // Cells start at y = caret.y − 6.
        for &(row_y, col) in &[(500, 0u32), (500, 2), (500, 75), (547, 1)] {
            let cell_x = 100 + 24 * col;
            let cell_y = (row_y - 6 + 10) as u32;
            page.fill_rect(cell_x + 4, cell_y, 8, 8);
        }

        let buf = page.buffer();
        let glyphs: Vec<Glyph> =
            Glyphs::new(buf, vec![caret(500), caret(547)], grid_layout(), 0, None)
                .collect::<Result<_, _>>()
                .expect("no out-of-bounds");

        let cells: Vec<(usize, usize)> = glyphs.iter().map(|g| (g.row, g.col)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 2), (0, 75), (1, 1)]);
        for g in &glyphs {
            assert_eq!(g.width, 24);
            assert_eq!(g.height, 43);
            assert_eq!(g.intensity.len(), 24 * 43);
            assert!(g.intensity.iter().any(|&v| v != 255));
        }
    }

    #[test]
    fn emits_at_most_column_count_per_row() {
        let mut page = TestPage::blank(2000, 3375);
        // Ink across the entire row band, well past column 75's cell.
        page.fill_rect(100, 500, 1900, 30);

        let buf = page.buffer();
        let glyphs: Vec<Glyph> = Glyphs::new(buf, vec![caret(500)], grid_layout(), 0, None)
            .collect::<Result<_, _>>()
            .expect("no out-of-bounds");
        assert_eq!(glyphs.len(), PAYLOAD_COLUMNS);
    }

    #[test]
    fn reports_out_of_bounds_instead_of_clamping() {
        let page = TestPage::blank(2000, 3375);
        let buf = page.buffer();
        // A caret so low that its glyph cells extend past the page bottom.
        let results: Vec<_> = Glyphs::new(buf, vec![caret(3360)], grid_layout(), 0, None).collect();
        assert_eq!(results.len(), PAYLOAD_COLUMNS);
        assert!(results.iter().all(|r| matches!(
            r,
            Err(SegmentError::OutOfBounds { .. })
        )));
    }

    #[test]
    fn intensity_uses_shifted_red_channel() {
        let mut page = TestPage::blank(2000, 3375);
        page.fill_rect(100, 500, 24, 30);

        let buf = page.buffer();
        let glyphs: Vec<Glyph> = Glyphs::new(buf, vec![caret(500)], grid_layout(), 3, None)
            .collect::<Result<_, _>>()
            .expect("no out-of-bounds");
        // With shift 3, white maps to 31 and ink to 0; nothing equals 255,
        // so even all-white cells are emitted.
        assert_eq!(glyphs.len(), PAYLOAD_COLUMNS);
        let g = &glyphs[0];
        assert!(g.intensity.contains(&0));
        assert!(g.intensity.contains(&31));
        assert!(!g.intensity.contains(&255));
    }
}
