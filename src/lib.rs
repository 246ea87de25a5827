//! # glyphgrid
//!
//! Recover binary payloads smuggled into rendered page images as a grid of
//! base64 glyphs.
//!
//! ## Why this crate?
//!
//! A document can be exfiltrated by encoding it as base64, typesetting the
//! text at a fixed 76-column wrap, and publishing page *images* of the
//! result. No metadata survives that round trip — the only way back is to
//! rediscover the text grid from pixels alone. This crate is that
//! self-calibrating engine: it locates the row-anchor marks ("carets") at
//! the start of every payload line, derives line spacing, column width, and
//! the block's bounding box purely from boundary scans, and slices the block
//! into an ordered stream of per-character bitmaps for an external
//! classifier.
//!
//! ## Pipeline Overview
//!
//! ```text
//! page image (RGBA)
//!  │
//!  ├─ 1. Carets    locate row anchors, filter header false positives
//!  ├─ 2. Layout    line height, column width, block bounds (all from pixels)
//!  ├─ 3. Slice     lazy row-major glyph bitmaps, blank cells dropped
//!  ├─ 4. Classify  injected port: bitmap → character
//!  └─ 5. Assemble  trim to markers, restore padding, decode base64
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glyphgrid::{segment_page, transcribe, Glyph, PixelBuffer, SegmentConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let page = image::open("page-002.png")?.to_rgba8();
//!     let buffer = PixelBuffer::from_rgba_image(&page);
//!     let config = SegmentConfig::default();
//!
//!     let segmentation = segment_page(buffer, &config, None)?;
//!     println!("line height: {}", segmentation.layout.line_height);
//!
//!     // Any `Fn(&Glyph) -> char` is a classifier.
//!     let classifier = |_glyph: &Glyph| '?';
//!     let text = transcribe(segmentation.glyphs(), &classifier)?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! ## Scope
//!
//! Image decoding, PDF page extraction, and the classifier itself are
//! external collaborators. The engine takes a decoded RGBA buffer per page
//! and hands glyph bitmaps to whatever implements [`Classifier`]. Everything
//! is synchronous and single-threaded; pages are independent, so callers may
//! parallelise across pages as long as each page's glyph order is preserved.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `glyphgrid` binary (clap + anyhow + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod buffer;
pub mod classify;
pub mod config;
pub mod error;
pub mod overlay;
pub mod pipeline;
pub mod segment;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{decode_payload, trim_to_markers, PayloadMarkers};
pub use buffer::PixelBuffer;
pub use classify::{transcribe, Classifier, CHARSET};
pub use config::{SegmentConfig, SegmentConfigBuilder};
pub use error::SegmentError;
pub use overlay::Overlay;
pub use pipeline::carets::{locate_carets, Caret, CaretScan};
pub use pipeline::layout::{calibrate, Layout, PAYLOAD_COLUMNS};
pub use pipeline::slice::{Glyph, Glyphs};
pub use segment::{segment_page, PageSegmentation};
