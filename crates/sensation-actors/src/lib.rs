//! Priority arbitration and motor control for haptic actuators.
//!
//! Each actor is one vibration motor wired to an outlet of a PWM driver
//! chip. Commands for an actor arrive as `(priority, intensity)` claims; the
//! [`PrioritizedIntensity`] resolver keeps the highest-priority claim and the
//! [`VibrationMotor`] turns it into a PWM duty cycle.
//!
//! # Motor response
//!
//! Small motors do not spin up at low duty cycles, and once spinning they
//! stall below some sustain level. A requested intensity `i` is therefore
//! mapped as
//!
//! ```text
//! output = min_intensity + (1 - min_intensity) * i ^ curve_degree
//! ```
//!
//! and any output below `min_instant_intensity` is only applied after the
//! motor has run for `warmup` at `min_instant_intensity` or more.
//!
//! # Example
//!
//! ```
//! use sensation_actors::PrioritizedIntensity;
//!
//! let mut claims = PrioritizedIntensity::new();
//! claims.set(100, 0.4);
//! claims.set(200, 0.9);
//! assert_eq!(claims.evaluate(), 0.9);
//!
//! claims.set(200, 0.0);
//! assert_eq!(claims.evaluate(), 0.4);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod driver;
pub mod dummy;
pub mod error;
pub mod motor;
pub mod prelude;
pub mod resolver;
pub mod topology;

pub use config::{ActorConfig, ActorEntry, DriverAddress, RegionConfig, SharedActorSettings};
pub use driver::{DriverBus, PWM_MAX_TICK, PWM_OUTLETS, PwmDriver, intensity_to_tick};
pub use dummy::{DummyBus, DummyDriver};
pub use error::{ActorError, ActorResult, DriverError};
pub use motor::{MotorParams, VibrationMotor};
pub use resolver::{PrioritizedIntensity, SENSITIVITY};
pub use topology::{Actor, Topology};
