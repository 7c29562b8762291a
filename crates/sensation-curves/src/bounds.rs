//! Value ranges used to normalise curve output into `[0, 1]`.

use serde::{Deserialize, Serialize};

/// Range widths at or below this are treated as a flat curve.
const FLAT_EPSILON: f32 = 1e-6;

/// Closed range `[min, max]` spanned by a curve's values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Smallest value reached.
    pub min: f32,
    /// Largest value reached.
    pub max: f32,
}

impl ValueRange {
    /// Range covering a single value.
    pub const fn point(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Grow the range so that it contains `value`.
    pub fn include(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Width of the range.
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Map `value` into `[0, 1]` relative to this range.
    ///
    /// A flat range cannot be rescaled, so the raw value is clamped instead.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.span();
        if span <= FLAT_EPSILON {
            return value.clamp(0.0, 1.0);
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}
