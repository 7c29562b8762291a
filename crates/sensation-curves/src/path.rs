//! Piecewise Bezier paths and their sampling cursors.

use std::sync::Arc;

use crate::bezier::{bezier, stationary_points};
use crate::bounds::ValueRange;
use crate::error::CurveError;
use crate::keyframe::Keyframe;

/// A validated sequence of keyframes.
///
/// Invariants: at least two keyframes, every coordinate finite, control point
/// times strictly increasing. The keyframes are shared, so handing out
/// timelines does not copy them.
#[derive(Clone, Debug, PartialEq)]
pub struct BezierPath {
    keyframes: Arc<[Keyframe]>,
}

impl BezierPath {
    /// Validate `keyframes` and build a path.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError`] if fewer than two keyframes are given, any
    /// coordinate is non-finite, or control point times do not strictly increase.
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self, CurveError> {
        if keyframes.len() < 2 {
            return Err(CurveError::TooFewKeyframes {
                count: keyframes.len(),
            });
        }

        for (index, keyframe) in keyframes.iter().enumerate() {
            if !keyframe.is_finite() {
                return Err(CurveError::NonFiniteValue {
                    keyframe_index: index,
                });
            }
        }

        for (index, pair) in keyframes.windows(2).enumerate() {
            if let [previous, current] = pair
                && current.control_point.time <= previous.control_point.time
            {
                return Err(CurveError::NonIncreasingTime {
                    keyframe_index: index + 1,
                    previous: previous.control_point.time,
                    current: current.control_point.time,
                });
            }
        }

        Ok(Self {
            keyframes: keyframes.into(),
        })
    }

    /// The keyframes in time order.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Time of the final control point.
    pub fn duration(&self) -> f32 {
        self.keyframes
            .last()
            .map_or(0.0, |keyframe| keyframe.control_point.time)
    }

    /// Start a new sampling cursor positioned at time zero.
    pub fn timeline(&self) -> Timeline {
        Timeline::new(Arc::clone(&self.keyframes))
    }

    /// Smallest range containing every value the path reaches.
    ///
    /// Endpoints of each segment are included together with the local
    /// extrema found from the roots of the segment's derivative.
    pub fn bounding_box(&self) -> ValueRange {
        let first = self
            .keyframes
            .first()
            .map_or(0.0, |keyframe| keyframe.control_point.value);
        let mut range = ValueRange::point(first);

        for pair in self.keyframes.windows(2) {
            let [start, end] = pair else { continue };
            let p0 = start.control_point.value;
            let p1 = start.out_handle().value;
            let p2 = end.in_handle().value;
            let p3 = end.control_point.value;

            range.include(p3);
            for t in stationary_points(p0, p1, p2, p3).into_iter().flatten() {
                range.include(bezier(t, p0, p1, p2, p3));
            }
        }

        range
    }
}

/// Resumable cursor over a [`BezierPath`].
///
/// Each [`advance`](Self::advance) moves the cursor forward by a time delta,
/// skipping whole segments if necessary, and returns the curve value there.
/// Once the cursor passes the last keyframe the timeline is finished and
/// keeps returning the final control value.
#[derive(Clone, Debug)]
pub struct Timeline {
    keyframes: Arc<[Keyframe]>,
    /// Index of the keyframe that ends the active segment.
    segment_end: usize,
    elapsed: f32,
    value: f32,
    finished: bool,
}

impl Timeline {
    fn new(keyframes: Arc<[Keyframe]>) -> Self {
        let mut timeline = Self {
            keyframes,
            segment_end: 1,
            elapsed: 0.0,
            value: 0.0,
            finished: false,
        };
        timeline.value = timeline.sample();
        timeline
    }

    /// Move forward by `delta` seconds and return the value at the new time.
    ///
    /// Negative deltas are ignored.
    pub fn advance(&mut self, delta: f32) -> f32 {
        if self.finished {
            return self.value;
        }
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }
        self.value = self.sample();
        self.value
    }

    /// Value at the current cursor position.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Seconds advanced since the timeline was created.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether the cursor has moved past the last keyframe.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn sample(&mut self) -> f32 {
        let Some(last) = self.keyframes.last() else {
            self.finished = true;
            return 0.0;
        };
        if self.elapsed > last.control_point.time {
            self.finished = true;
            return last.control_point.value;
        }

        while let Some(end) = self.keyframes.get(self.segment_end)
            && self.elapsed > end.control_point.time
        {
            self.segment_end += 1;
        }

        let start = self
            .segment_end
            .checked_sub(1)
            .and_then(|index| self.keyframes.get(index));
        let (Some(start), Some(end)) = (start, self.keyframes.get(self.segment_end)) else {
            self.finished = true;
            return last.control_point.value;
        };

        let span = end.control_point.time - start.control_point.time;
        let t = ((self.elapsed - start.control_point.time) / span).clamp(0.0, 1.0);

        bezier(
            t,
            start.control_point.value,
            start.out_handle().value,
            end.in_handle().value,
            end.control_point.value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::Point;
    use approx::assert_abs_diff_eq;

    fn must<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
        match result {
            Ok(v) => v,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    fn ramp() -> BezierPath {
        must(BezierPath::new(vec![
            Keyframe::new(Point::new(0.0, 0.0)),
            Keyframe::new(Point::new(1.0, 1.0)),
        ]))
    }

    #[test]
    fn test_rejects_single_keyframe() {
        let result = BezierPath::new(vec![Keyframe::new(Point::new(0.0, 0.0))]);
        assert_eq!(result, Err(CurveError::TooFewKeyframes { count: 1 }));
    }

    #[test]
    fn test_rejects_decreasing_time() {
        let result = BezierPath::new(vec![
            Keyframe::new(Point::new(0.0, 0.0)),
            Keyframe::new(Point::new(1.0, 1.0)),
            Keyframe::new(Point::new(1.0, 0.0)),
        ]);
        assert!(matches!(
            result,
            Err(CurveError::NonIncreasingTime {
                keyframe_index: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let result = BezierPath::new(vec![
            Keyframe::new(Point::new(0.0, f32::NAN)),
            Keyframe::new(Point::new(1.0, 1.0)),
        ]);
        assert_eq!(result, Err(CurveError::NonFiniteValue { keyframe_index: 0 }));
    }

    #[test]
    fn test_timeline_starts_at_first_value() {
        let timeline = ramp().timeline();
        assert_abs_diff_eq!(timeline.value(), 0.0);
        assert!(!timeline.is_finished());
    }

    #[test]
    fn test_timeline_reaches_last_keyframe_exactly() {
        let mut timeline = ramp().timeline();
        assert_abs_diff_eq!(timeline.advance(1.0), 1.0);
        assert!(!timeline.is_finished());
    }

    #[test]
    fn test_timeline_finishes_past_end() {
        let mut timeline = ramp().timeline();
        assert_abs_diff_eq!(timeline.advance(5.0), 1.0);
        assert!(timeline.is_finished());
        assert_abs_diff_eq!(timeline.advance(1.0), 1.0);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut timeline = ramp().timeline();
        let before = timeline.advance(0.5);
        assert_abs_diff_eq!(timeline.advance(-0.25), before);
        assert_abs_diff_eq!(timeline.elapsed(), 0.5);
    }

    #[test]
    fn test_bounding_box_of_flat_ramp() {
        let range = ramp().bounding_box();
        assert_abs_diff_eq!(range.min, 0.0);
        assert_abs_diff_eq!(range.max, 1.0);
    }

    #[test]
    fn test_duration() {
        assert_abs_diff_eq!(ramp().duration(), 1.0);
    }
}
