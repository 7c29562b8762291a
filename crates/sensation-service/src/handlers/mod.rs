//! Stages that act on decoded commands.

pub mod pattern;
pub mod vibration;

pub use pattern::PatternHandler;
pub use vibration::VibrationHandler;
