//! Segmentation stages, leaves first.
//!
//! Each submodule implements exactly one step, and every stage receives the
//! pixel buffer as an explicit parameter — there is no shared canvas state.
//!
//! ## Data Flow
//!
//! ```text
//! pixels ──▶ carets ──▶ layout ──▶ slice
//! (RGBA)   (anchors)  (geometry) (glyph bitmaps)
//! ```
//!
//! 1. [`scan`]   — the boundary-scanning primitive everything else is built on
//! 2. [`carets`] — locate the row-anchor marks, filter header false positives
//! 3. [`layout`] — derive line spacing, block bounds, and column width
//! 4. [`slice`]  — walk the calibrated grid and yield per-cell bitmaps lazily

pub mod carets;
pub mod layout;
pub mod scan;
pub mod slice;
