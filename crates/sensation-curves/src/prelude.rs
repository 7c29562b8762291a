//! Convenience re-exports for pattern curve users.

pub use crate::bezier::bezier;
pub use crate::bounds::ValueRange;
pub use crate::error::CurveError;
pub use crate::keyframe::{Keyframe, Point};
pub use crate::path::{BezierPath, Timeline};
