//! Classifier port: the seam between segmentation and recognition.
//!
//! The engine never classifies glyphs itself — a neural model, a template
//! matcher, or (in tests) an exact bitmap lookup is injected through the
//! [`Classifier`] trait. [`transcribe`] drives a page's glyph sequence
//! through a classifier in emission order, which is the payload's reading
//! order.

use crate::error::SegmentError;
use crate::pipeline::slice::{Glyph, Glyphs};

/// Label alphabet used by the reference classifier: the 64 base64 symbols
/// plus `=` padding and a `?` reject class.
pub const CHARSET: &str = "abcdefghijklmnopqrstuvwyxzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789+/=?";

/// Maps one glyph bitmap to a character.
pub trait Classifier {
    fn classify(&self, glyph: &Glyph) -> char;
}

/// Any plain function over a glyph is a classifier.
impl<F> Classifier for F
where
    F: Fn(&Glyph) -> char,
{
    fn classify(&self, glyph: &Glyph) -> char {
        self(glyph)
    }
}

/// Classify every glyph of a page, in emission order.
///
/// Stops at the first slicing error; a partial transcription would silently
/// corrupt the reconstructed payload.
pub fn transcribe<C: Classifier>(
    glyphs: Glyphs<'_>,
    classifier: &C,
) -> Result<String, SegmentError> {
    let mut out = String::new();
    for glyph in glyphs {
        out.push(classifier.classify(&glyph?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_has_sixty_six_labels() {
        assert_eq!(CHARSET.chars().count(), 66);
        assert!(CHARSET.contains('='));
        assert!(CHARSET.contains('?'));
        assert!(CHARSET.contains('+'));
        assert!(CHARSET.contains('/'));
    }

    #[test]
    fn closures_are_classifiers() {
        let c = |g: &Glyph| if g.col % 2 == 0 { 'a' } else { 'b' };
        let glyph = Glyph {
            row: 0,
            col: 1,
            width: 1,
            height: 1,
            intensity: vec![0],
        };
        assert_eq!(c.classify(&glyph), 'b');
    }
}
