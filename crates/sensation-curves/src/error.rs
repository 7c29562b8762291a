//! Error types for curve operations.

use std::fmt;

/// Error type for keyframe path validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveError {
    /// A path needs at least a start and an end keyframe.
    TooFewKeyframes {
        /// Number of keyframes supplied.
        count: usize,
    },
    /// A control point or tangent handle carries NaN or infinity.
    NonFiniteValue {
        /// Index of the offending keyframe.
        keyframe_index: usize,
    },
    /// Control point times must strictly increase along the path.
    NonIncreasingTime {
        /// Index of the keyframe whose time does not exceed its predecessor's.
        keyframe_index: usize,
        /// Time of the preceding keyframe.
        previous: f32,
        /// Time of the offending keyframe.
        current: f32,
    },
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewKeyframes { count } => {
                write!(f, "Bezier path needs at least 2 keyframes, got {count}")
            }
            Self::NonFiniteValue { keyframe_index } => {
                write!(f, "Keyframe {keyframe_index} contains a non-finite coordinate")
            }
            Self::NonIncreasingTime {
                keyframe_index,
                previous,
                current,
            } => write!(
                f,
                "Keyframe {keyframe_index} time {current} does not follow previous time {previous}"
            ),
        }
    }
}

impl std::error::Error for CurveError {}
