//! Seams to the PWM chip layer.
//!
//! The driver chips are 16-channel, 12-bit PWM controllers on an I2C bus.
//! Each channel's duty cycle is set by the tick at which the output turns on
//! and the tick at which it turns off within one 4096-tick period.

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::DriverAddress;
use crate::error::DriverError;

/// Highest tick of a PWM period.
pub const PWM_MAX_TICK: u16 = 4095;

/// Channels per driver chip.
pub const PWM_OUTLETS: u8 = 16;

/// One PWM driver chip. Shared by every actor wired to it.
pub trait PwmDriver: Send + Sync + Debug {
    /// Bus and address the chip was opened at.
    fn address(&self) -> DriverAddress;

    /// Set one outlet's on/off ticks.
    fn set_pwm(&self, outlet: u8, on_tick: u16, off_tick: u16) -> Result<(), DriverError>;

    /// Set every outlet's on/off ticks at once.
    fn set_all_pwm(&self, on_tick: u16, off_tick: u16) -> Result<(), DriverError>;

    /// Set the PWM frequency.
    fn set_frequency(&self, hz: f32) -> Result<(), DriverError>;
}

/// Discovery and opening of driver chips.
pub trait DriverBus: Send + Sync + Debug {
    /// Whether a chip acknowledges at `address`.
    fn is_device_answering(&self, address: DriverAddress) -> bool;

    /// Open the chip at `address`.
    fn open(&self, address: DriverAddress) -> Result<Arc<dyn PwmDriver>, DriverError>;
}

/// Off tick for an intensity in `[0, 1]`; values outside are clamped.
pub fn intensity_to_tick(intensity: f32) -> u16 {
    let scaled = (intensity.clamp(0.0, 1.0) * f32::from(PWM_MAX_TICK)).round();
    // clamped to [0, 4095] above, NaN saturates to 0
    scaled as u16
}
