//! Read-only view over one decoded page.
//!
//! The engine never owns or mutates pixels: a [`PixelBuffer`] borrows the
//! caller's RGBA bytes for the duration of one page's segmentation. This
//! replaces the original tool's implicit "current canvas" global — every
//! stage receives the buffer as an explicit parameter.
//!
//! Layout is row-major, four 8-bit channels per pixel (R, G, B, A). Only the
//! first three channels participate in blank/ink classification and only the
//! red channel feeds glyph intensities; alpha is carried but ignored.

use crate::error::SegmentError;

/// Borrowed, read-only, row-major RGBA pixel grid for exactly one page.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wrap a raw RGBA byte slice, validating its length.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, SegmentError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(SegmentError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Borrow a decoded [`image::RgbaImage`] as a pixel buffer.
    ///
    /// `RgbaImage` guarantees a packed row-major RGBA layout, so this never
    /// fails.
    pub fn from_rgba_image(img: &'a image::RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.as_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// R, G, B channels at `(x, y)`, or `None` outside the buffer.
    ///
    /// Signed coordinates so scan arithmetic can probe one step past an edge
    /// without wrapping; out-of-range probes classify as blank at the call
    /// sites.
    pub fn rgb(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some((self.data[idx], self.data[idx + 1], self.data[idx + 2]))
    }

    /// Copy a `w × h` RGBA rectangle starting at `(x, y)` with one memcpy
    /// per row.
    ///
    /// Callers must have bounds-checked the rectangle; the slicer reports
    /// [`SegmentError::OutOfBounds`] before ever calling this.
    pub fn copy_rect(&self, x: u32, y: u32, w: u32, h: u32) -> Vec<u8> {
        assert!(
            x + w <= self.width && y + h <= self.height,
            "rect {}x{} at ({}, {}) outside {}x{} buffer",
            w,
            h,
            x,
            y,
            self.width,
            self.height
        );
        let row_bytes = w as usize * 4;
        let mut out = Vec::with_capacity(row_bytes * h as usize);
        for row in 0..h as usize {
            let start = ((y as usize + row) * self.width as usize + x as usize) * 4;
            out.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        out
    }
}
