//! Prelude for actor users.

pub use crate::config::{ActorConfig, DriverAddress};
pub use crate::driver::{DriverBus, PwmDriver};
pub use crate::dummy::{DummyBus, DummyDriver};
pub use crate::error::{ActorError, ActorResult, DriverError};
pub use crate::motor::{MotorParams, VibrationMotor};
pub use crate::resolver::{PrioritizedIntensity, SENSITIVITY};
pub use crate::topology::{Actor, Topology};
