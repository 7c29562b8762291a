//! Mock implementations of the PWM driver seams.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sensation_actors::{DriverAddress, DriverBus, DriverError, PWM_MAX_TICK, PwmDriver};
use tokio::time::Instant;

/// One recorded `set_pwm` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmWrite {
    /// Time since the first recorded write.
    pub at: Duration,
    /// Outlet written.
    pub outlet: u8,
    /// On tick.
    pub on_tick: u16,
    /// Off tick.
    pub off_tick: u16,
}

impl PwmWrite {
    /// Duty cycle of the write in `[0, 1]`.
    pub fn intensity(&self) -> f32 {
        f32::from(self.off_tick) / f32::from(PWM_MAX_TICK)
    }
}

/// Driver recording every call with its time.
#[derive(Debug)]
pub struct MockPwmDriver {
    address: DriverAddress,
    started: Mutex<Option<Instant>>,
    writes: Mutex<Vec<PwmWrite>>,
    all_writes: Mutex<Vec<(u16, u16)>>,
    frequencies: Mutex<Vec<f32>>,
    fail_on_write: bool,
}

impl MockPwmDriver {
    /// Working mock at 1:0x40.
    pub fn new() -> Self {
        Self::at(DriverAddress::new(1, 0x40))
    }

    /// Working mock at `address`.
    pub fn at(address: DriverAddress) -> Self {
        Self {
            address,
            started: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
            all_writes: Mutex::new(Vec::new()),
            frequencies: Mutex::new(Vec::new()),
            fail_on_write: false,
        }
    }

    /// Mock whose `set_pwm` records the call and then fails.
    pub fn with_failure() -> Self {
        Self {
            fail_on_write: true,
            ..Self::new()
        }
    }

    /// Shared handle, ready to be passed as `Arc<dyn PwmDriver>`.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Recorded `set_pwm` calls.
    pub fn writes(&self) -> Vec<PwmWrite> {
        self.writes.lock().clone()
    }

    /// Recorded `set_pwm` calls on one outlet.
    pub fn writes_to(&self, outlet: u8) -> Vec<PwmWrite> {
        self.writes
            .lock()
            .iter()
            .filter(|w| w.outlet == outlet)
            .copied()
            .collect()
    }

    /// Last `set_pwm` call.
    pub fn last_write(&self) -> Option<PwmWrite> {
        self.writes.lock().last().copied()
    }

    /// Recorded `set_all_pwm` calls.
    pub fn all_writes(&self) -> Vec<(u16, u16)> {
        self.all_writes.lock().clone()
    }

    /// Recorded `set_frequency` calls.
    pub fn frequencies(&self) -> Vec<f32> {
        self.frequencies.lock().clone()
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.writes.lock().clear();
        self.all_writes.lock().clear();
        self.frequencies.lock().clear();
    }

    fn elapsed(&self) -> Duration {
        let now = Instant::now();
        let started = *self.started.lock().get_or_insert(now);
        now.saturating_duration_since(started)
    }
}

impl Default for MockPwmDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmDriver for MockPwmDriver {
    fn address(&self) -> DriverAddress {
        self.address
    }

    fn set_pwm(&self, outlet: u8, on_tick: u16, off_tick: u16) -> Result<(), DriverError> {
        let at = self.elapsed();
        self.writes.lock().push(PwmWrite {
            at,
            outlet,
            on_tick,
            off_tick,
        });
        if self.fail_on_write {
            return Err(DriverError::Transfer {
                address: self.address.address,
                reason: "Mock write failure".to_string(),
            });
        }
        Ok(())
    }

    fn set_all_pwm(&self, on_tick: u16, off_tick: u16) -> Result<(), DriverError> {
        self.all_writes.lock().push((on_tick, off_tick));
        Ok(())
    }

    fn set_frequency(&self, hz: f32) -> Result<(), DriverError> {
        self.frequencies.lock().push(hz);
        Ok(())
    }
}

/// Bus handing out [`MockPwmDriver`]s for a fixed set of answering addresses.
#[derive(Debug, Default)]
pub struct MockBus {
    answering: BTreeSet<DriverAddress>,
    opened: Mutex<Vec<Arc<MockPwmDriver>>>,
}

impl MockBus {
    /// Bus on which only `addresses` answer.
    pub fn with_devices(addresses: impl IntoIterator<Item = DriverAddress>) -> Self {
        Self {
            answering: addresses.into_iter().collect(),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Drivers opened so far, in order.
    pub fn opened(&self) -> Vec<Arc<MockPwmDriver>> {
        self.opened.lock().clone()
    }

    /// Driver opened at `address`, if any.
    pub fn driver(&self, address: DriverAddress) -> Option<Arc<MockPwmDriver>> {
        self.opened
            .lock()
            .iter()
            .find(|d| d.address() == address)
            .cloned()
    }
}

impl DriverBus for MockBus {
    fn is_device_answering(&self, address: DriverAddress) -> bool {
        self.answering.contains(&address)
    }

    fn open(&self, address: DriverAddress) -> Result<Arc<dyn PwmDriver>, DriverError> {
        if !self.answering.contains(&address) {
            return Err(DriverError::NotAnswering {
                bus: address.bus,
                address: address.address,
            });
        }
        let driver = MockPwmDriver::at(address).shared();
        self.opened.lock().push(Arc::clone(&driver));
        Ok(driver)
    }
}
