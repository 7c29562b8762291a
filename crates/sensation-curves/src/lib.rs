//! Keyframed Bezier curves for haptic intensity patterns.
//!
//! A pattern track describes how one motor's intensity evolves over time as a
//! sequence of keyframes. Each pair of adjacent keyframes forms one cubic
//! Bezier segment whose four control values are:
//!
//! ```text
//!  start.out_tangent ___ end.in_tangent
//!                   |/   \|
//!     start.control       end.control
//! ```
//!
//! Only the `value` of a tangent handle shapes the curve. Time is mapped
//! linearly from the segment's start to its end control point.
//!
//! # Example
//!
//! ```
//! use sensation_curves::{BezierPath, Keyframe, Point};
//!
//! let path = BezierPath::new(vec![
//!     Keyframe::new(Point::new(0.0, 0.0)).with_out_tangent(Point::new(0.6, 0.0)),
//!     Keyframe::new(Point::new(1.8, 2.0)).with_in_tangent(Point::new(1.2, -1.279795)),
//! ])?;
//!
//! let mut timeline = path.timeline();
//! assert!((timeline.value() - 0.0).abs() < 1e-6);
//!
//! let halfway = timeline.advance(0.9);
//! assert!((halfway - -0.2299231).abs() < 1e-4);
//!
//! let range = path.bounding_box();
//! assert!(range.min < 0.0 && range.max > 1.9);
//! # Ok::<(), sensation_curves::CurveError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod bezier;
pub mod bounds;
pub mod error;
pub mod keyframe;
pub mod path;
pub mod prelude;

pub use bezier::bezier;
pub use bounds::ValueRange;
pub use error::CurveError;
pub use keyframe::{Keyframe, Point};
pub use path::{BezierPath, Timeline};
