//! Maps absolute span timestamps onto a shared [0, 1] timeline so that the
//! render layer can draw bars without knowing anything about absolute time.

use crate::types::{Span, TimePoint};

/// Smallest relative width a bar is drawn with, so zero-duration spans stay
/// visible and clickable. Applied at render time via [SpanInterval::clamped_width],
/// the raw interval math below is left exact.
pub const MIN_VISIBLE_WIDTH: f64 = 0.001;

/// The global time window of one trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    pub min_time: TimePoint,
    pub max_time: TimePoint,
}

/// A span's position on the shared timeline, both values in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanInterval {
    pub relative_start: f64,
    pub relative_width: f64,
}

impl Timeline {
    /// `None` when the batch is empty.
    pub fn from_spans(spans: &[Span]) -> Option<Timeline> {
        if spans.is_empty() {
            return None;
        }
        let mut min_time = f64::MAX;
        let mut max_time = f64::MIN;
        for span in spans {
            min_time = min_time.min(span.start_time);
            max_time = max_time.max(span.end_time());
        }
        Some(Timeline { min_time, max_time })
    }

    pub fn duration(&self) -> f64 {
        self.max_time - self.min_time
    }

    pub fn interval(&self, span: &Span) -> SpanInterval {
        let range = self.max_time - self.min_time;
        // A single zero-duration span (or all spans identical) gives a zero
        // range. Dividing would produce NaN/inf, fall back to an empty interval.
        if range <= 0.0 {
            return SpanInterval {
                relative_start: 0.0,
                relative_width: 0.0,
            };
        }
        SpanInterval {
            relative_start: (span.start_time - self.min_time) / range,
            relative_width: span.duration / range,
        }
    }
}

impl SpanInterval {
    pub fn clamped_width(&self, min_width: f64) -> f64 {
        self.relative_width.max(min_width)
    }
}
