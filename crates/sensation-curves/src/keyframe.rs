//! Control points and keyframes.

use serde::{Deserialize, Serialize};

/// A `(time, value)` pair. Time is in seconds relative to pattern start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Seconds since the start of the pattern.
    pub time: f32,
    /// Curve value at `time`.
    pub value: f32,
}

impl Point {
    /// Create a point.
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.time.is_finite() && self.value.is_finite()
    }
}

/// A control point with optional Bezier tangent handles.
///
/// A missing handle collapses onto the control point itself, which flattens
/// the curve's slope at that end of the segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// The point the curve passes through.
    pub control_point: Point,
    /// Handle shaping the segment that ends at this keyframe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_tangent: Option<Point>,
    /// Handle shaping the segment that starts at this keyframe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_tangent: Option<Point>,
}

impl Keyframe {
    /// Create a keyframe without tangent handles.
    pub const fn new(control_point: Point) -> Self {
        Self {
            control_point,
            in_tangent: None,
            out_tangent: None,
        }
    }

    /// Set the incoming tangent handle.
    pub fn with_in_tangent(mut self, handle: Point) -> Self {
        self.in_tangent = Some(handle);
        self
    }

    /// Set the outgoing tangent handle.
    pub fn with_out_tangent(mut self, handle: Point) -> Self {
        self.out_tangent = Some(handle);
        self
    }

    /// Incoming handle, or the control point when none is set.
    pub fn in_handle(&self) -> Point {
        self.in_tangent.unwrap_or(self.control_point)
    }

    /// Outgoing handle, or the control point when none is set.
    pub fn out_handle(&self) -> Point {
        self.out_tangent.unwrap_or(self.control_point)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.control_point.is_finite()
            && self.in_tangent.is_none_or(|p| p.is_finite())
            && self.out_tangent.is_none_or(|p| p.is_finite())
    }
}
