//! Stand-in driver layer for machines without the PWM hardware.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::config::DriverAddress;
use crate::driver::{DriverBus, PWM_OUTLETS, PwmDriver};
use crate::error::DriverError;

/// Driver that only logs and remembers the last ticks per outlet.
#[derive(Debug)]
pub struct DummyDriver {
    address: DriverAddress,
    outlets: Mutex<[(u16, u16); PWM_OUTLETS as usize]>,
    frequency: Mutex<Option<f32>>,
}

impl DummyDriver {
    /// Create a dummy chip at `address`.
    pub fn new(address: DriverAddress) -> Self {
        Self {
            address,
            outlets: Mutex::new([(0, 0); PWM_OUTLETS as usize]),
            frequency: Mutex::new(None),
        }
    }

    /// Last `(on, off)` ticks written to `outlet`.
    pub fn outlet(&self, outlet: u8) -> Option<(u16, u16)> {
        self.outlets.lock().get(usize::from(outlet)).copied()
    }

    /// Last frequency set.
    pub fn frequency(&self) -> Option<f32> {
        *self.frequency.lock()
    }
}

impl PwmDriver for DummyDriver {
    fn address(&self) -> DriverAddress {
        self.address
    }

    fn set_pwm(&self, outlet: u8, on_tick: u16, off_tick: u16) -> Result<(), DriverError> {
        let mut outlets = self.outlets.lock();
        let slot = outlets
            .get_mut(usize::from(outlet))
            .ok_or(DriverError::InvalidOutlet {
                outlet,
                max: PWM_OUTLETS - 1,
            })?;
        *slot = (on_tick, off_tick);
        trace!(driver = %self.address, outlet, on_tick, off_tick, "setPWM");
        Ok(())
    }

    fn set_all_pwm(&self, on_tick: u16, off_tick: u16) -> Result<(), DriverError> {
        self.outlets.lock().fill((on_tick, off_tick));
        trace!(driver = %self.address, on_tick, off_tick, "setAllPWM");
        Ok(())
    }

    fn set_frequency(&self, hz: f32) -> Result<(), DriverError> {
        *self.frequency.lock() = Some(hz);
        trace!(driver = %self.address, hz, "setPWMFreq");
        Ok(())
    }
}

/// Bus on which every address answers with a [`DummyDriver`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyBus;

impl DriverBus for DummyBus {
    fn is_device_answering(&self, _address: DriverAddress) -> bool {
        true
    }

    fn open(&self, address: DriverAddress) -> Result<Arc<dyn PwmDriver>, DriverError> {
        Ok(Arc::new(DummyDriver::new(address)))
    }
}
