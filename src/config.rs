//! Configuration for the segmentation engine.
//!
//! Every threshold the pipeline relies on lives in one [`SegmentConfig`],
//! built via its [`SegmentConfigBuilder`]. Keeping the knobs together makes
//! it trivial to share a config across pages, serialise it for logging, and
//! diff two runs to understand why their glyph streams differ.
//!
//! All pixel-space references (caret width, line padding, glyph y offset)
//! are expressed at [`SegmentConfig::reference_page_height`] and rescaled
//! linearly to the actual page height before use. The cutoffs are deliberately
//! asymmetric: caret ink is near-black so the caret scans use a near-white
//! cutoff, while glyph ink is anti-aliased and lighter, so the payload block's
//! left and right edges use looser cutoffs. Changing one without the others
//! usually breaks column arithmetic on real scans.

use crate::error::SegmentError;
use serde::{Deserialize, Serialize};

/// Configuration for page segmentation.
///
/// Built via [`SegmentConfig::builder()`] or [`SegmentConfig::default()`].
///
/// # Example
/// ```rust
/// use glyphgrid::SegmentConfig;
///
/// let config = SegmentConfig::builder()
///     .caret_cutoff(250)
///     .intensity_shift(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Page height at which the pixel-space references below were measured.
    /// Default: 3375.
    ///
    /// The actual page height divided by this value yields the scale factor
    /// applied to `reference_caret_width`, `reference_line_padding`, and
    /// `reference_glyph_y_offset`.
    pub reference_page_height: f64,

    /// Caret width in pixels at the reference page height. Default: 24.
    ///
    /// Only an estimate used to seed the caret-band scans; the exact width is
    /// measured from the first located caret.
    pub reference_caret_width: f64,

    /// Vertical padding subtracted from the line height to obtain the glyph
    /// cell height, at the reference page height. Default: 4.
    pub reference_line_padding: f64,

    /// Offset subtracted from a caret's `y` to reach the top of its glyph
    /// cells, at the reference page height. Default: 6.
    pub reference_glyph_y_offset: f64,

    /// Maximum number of caret rows to walk per page. Default: 65.
    ///
    /// The walk stops earlier when it runs off the top of the page; this cap
    /// bounds the work on pathological pages.
    pub max_rows: usize,

    /// Near-white cutoff for caret detection scans. Default: 254.
    ///
    /// A pixel counts as ink when any of R, G, B falls below the cutoff.
    /// Caret marks are printed near-black, so 254 catches them while ignoring
    /// scanner noise in the paper background.
    pub caret_cutoff: u8,

    /// Cutoff for the payload block's left edge. Default: 230.
    ///
    /// Looser than the caret cutoff because the leftmost glyph column may
    /// start with anti-aliased ink. Intentionally different from
    /// `right_cutoff`; the asymmetry was tuned on real pages.
    pub left_cutoff: u8,

    /// Cutoff for the payload block's right edge. Default: 240.
    pub right_cutoff: u8,

    /// Right shift applied to the red channel when deriving glyph intensity.
    /// Default: 0 (full 8-bit intensity).
    ///
    /// A coarse-quantisation knob for classifier experiments. Note that with
    /// a non-zero shift no derived intensity can equal 255, so blank-cell
    /// dropping is effectively disabled.
    pub intensity_shift: u8,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            reference_page_height: 3375.0,
            reference_caret_width: 24.0,
            reference_line_padding: 4.0,
            reference_glyph_y_offset: 6.0,
            max_rows: 65,
            caret_cutoff: 254,
            left_cutoff: 230,
            right_cutoff: 240,
            intensity_shift: 0,
        }
    }
}

impl SegmentConfig {
    /// Create a new builder for `SegmentConfig`.
    pub fn builder() -> SegmentConfigBuilder {
        SegmentConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor for a page of the given height.
    pub fn scale_for(&self, page_height: u32) -> f64 {
        page_height as f64 / self.reference_page_height
    }
}

/// Builder for [`SegmentConfig`].
#[derive(Debug)]
pub struct SegmentConfigBuilder {
    config: SegmentConfig,
}

impl SegmentConfigBuilder {
    pub fn reference_page_height(mut self, h: f64) -> Self {
        self.config.reference_page_height = h;
        self
    }

    pub fn reference_caret_width(mut self, w: f64) -> Self {
        self.config.reference_caret_width = w;
        self
    }

    pub fn reference_line_padding(mut self, p: f64) -> Self {
        self.config.reference_line_padding = p;
        self
    }

    pub fn reference_glyph_y_offset(mut self, o: f64) -> Self {
        self.config.reference_glyph_y_offset = o;
        self
    }

    pub fn max_rows(mut self, n: usize) -> Self {
        self.config.max_rows = n;
        self
    }

    pub fn caret_cutoff(mut self, c: u8) -> Self {
        self.config.caret_cutoff = c;
        self
    }

    pub fn left_cutoff(mut self, c: u8) -> Self {
        self.config.left_cutoff = c;
        self
    }

    pub fn right_cutoff(mut self, c: u8) -> Self {
        self.config.right_cutoff = c;
        self
    }

    pub fn intensity_shift(mut self, s: u8) -> Self {
        self.config.intensity_shift = s;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SegmentConfig, SegmentError> {
        let c = &self.config;
        if !(c.reference_page_height > 0.0) {
            return Err(SegmentError::InvalidConfig(format!(
                "reference_page_height must be positive, got {}",
                c.reference_page_height
            )));
        }
        if !(c.reference_caret_width > 0.0) {
            return Err(SegmentError::InvalidConfig(format!(
                "reference_caret_width must be positive, got {}",
                c.reference_caret_width
            )));
        }
        if c.max_rows < 2 {
            return Err(SegmentError::InvalidConfig(format!(
                "max_rows must be at least 2 (need two carets for line spacing), got {}",
                c.max_rows
            )));
        }
        if c.intensity_shift >= 8 {
            return Err(SegmentError::InvalidConfig(format!(
                "intensity_shift must be 0–7, got {}",
                c.intensity_shift
            )));
        }
        if c.caret_cutoff == 0 || c.left_cutoff == 0 || c.right_cutoff == 0 {
            return Err(SegmentError::InvalidConfig(
                "cutoffs must be non-zero (0 would classify every line as blank)".into(),
            ));
        }
        Ok(self.config)
    }
}
