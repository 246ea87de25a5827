//! Optional visualization port for detected geometry.
//!
//! During calibration and slicing the engine reports every boundary it finds
//! — caret boxes, the non-caret bottom, the payload block edges, and each
//! emitted glyph cell — as line segments. Callers that want a visual debug
//! record implement [`Overlay`] and pass `Some(&mut sink)`; everyone else
//! passes `None` and pays nothing.
//!
//! The port is injected, never probed: segmentation results are identical
//! with and without a sink attached.

/// Receives line segments for every detected boundary.
///
/// All coordinates are in page-pixel space. Every segment the engine emits is
/// axis-aligned, but implementations should not rely on that.
pub trait Overlay {
    /// Record one line segment from `(x1, y1)` to `(x2, y2)`.
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32);
}

/// Forward to the sink when one is attached.
pub(crate) fn line(
    overlay: &mut Option<&mut (dyn Overlay + '_)>,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
) {
    if let Some(sink) = overlay.as_deref_mut() {
        sink.draw_line(x1, y1, x2, y2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        segments: Vec<(i32, i32, i32, i32)>,
    }

    impl Overlay for Recorder {
        fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
            self.segments.push((x1, y1, x2, y2));
        }
    }

    #[test]
    fn forwards_when_attached() {
        let mut rec = Recorder::default();
        let mut overlay: Option<&mut dyn Overlay> = Some(&mut rec);
        line(&mut overlay, 1, 2, 3, 4);
        line(&mut overlay, 5, 6, 7, 8);
        assert_eq!(rec.segments, vec![(1, 2, 3, 4), (5, 6, 7, 8)]);
    }

    #[test]
    fn noop_when_absent() {
        let mut overlay: Option<&mut dyn Overlay> = None;
        line(&mut overlay, 1, 2, 3, 4);
    }
}
