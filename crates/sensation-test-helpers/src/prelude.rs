//! Convenience re-exports for common test utilities.

pub use crate::must::{must, must_async, must_some, must_with};

#[cfg(feature = "mock")]
pub use crate::frames::{frame, load_frame, play_frame, raw_frame, vibration_frame};

#[cfg(feature = "mock")]
pub use crate::mock::{MockBus, MockPwmDriver, PwmWrite};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
