//! Region/actor wiring built from an [`ActorConfig`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use sensation_protocol::Region;
use tracing::{error, info, warn};

use crate::config::{ActorConfig, DriverAddress};
use crate::driver::{DriverBus, PWM_OUTLETS, PwmDriver};
use crate::error::{ActorError, ActorResult};
use crate::motor::VibrationMotor;

/// One configured actuator.
#[derive(Debug)]
pub struct Actor {
    /// Region the actor is mounted in.
    pub region: Region,
    /// Index inside the region.
    pub index: u32,
    /// Mounting description.
    pub position: String,
    /// The motor driving it.
    pub motor: VibrationMotor,
}

/// Every configured driver and actor.
#[derive(Debug, Default)]
pub struct Topology {
    drivers: BTreeMap<DriverAddress, Arc<dyn PwmDriver>>,
    regions: HashMap<Region, BTreeMap<u32, Arc<Actor>>>,
}

impl Topology {
    /// Empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open drivers and create actors for `config`.
    ///
    /// Drivers are shared between regions at the same address and get their
    /// PWM frequency set once. Problems with a single region or actor are
    /// logged and that part is skipped:
    ///
    /// - no chip answering at the region's address
    /// - unknown region name
    /// - duplicate index within a region (the first definition wins)
    /// - outlet out of range or unusable motor parameters
    pub fn build(config: &ActorConfig, bus: &dyn DriverBus, pwm_frequency_hz: f32) -> Self {
        let mut topology = Self::new();

        for region_config in &config.vibration.regions {
            let address = region_config.driver();

            let region = match region_config.region() {
                Ok(region) => region,
                Err(e) => {
                    error!(error = %e, "Region with unknown name configured - ignoring region");
                    continue;
                }
            };

            let driver = match topology.drivers.get(&address) {
                Some(driver) => Arc::clone(driver),
                None => match open_driver(bus, address, pwm_frequency_hz) {
                    Ok(driver) => {
                        topology.drivers.insert(address, Arc::clone(&driver));
                        driver
                    }
                    Err(e) => {
                        error!(%address, %region, error = %e, "No driver available - ignoring region");
                        continue;
                    }
                },
            };

            for entry in &region_config.actors {
                if entry.outlet >= PWM_OUTLETS {
                    error!(%region, index = entry.index, outlet = entry.outlet, "Outlet out of range - ignoring actor");
                    continue;
                }

                let params = match config
                    .resolve_params(region_config, entry)
                    .and_then(|params| params.validate().map(|()| params))
                {
                    Ok(params) => params,
                    Err(e) => {
                        error!(%region, index = entry.index, error = %e, "Invalid motor parameters - ignoring actor");
                        continue;
                    }
                };

                let actor = Actor {
                    region,
                    index: entry.index,
                    position: entry.position.clone(),
                    motor: VibrationMotor::new(Arc::clone(&driver), entry.outlet, params),
                };
                if let Err(e) = topology.insert(actor) {
                    error!(error = %e, "ignoring subsequent definition");
                }
            }
        }

        info!(
            drivers = topology.drivers.len(),
            actors = topology.actor_count(),
            "actor topology loaded"
        );
        topology
    }

    /// Add an actor.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::DuplicateActor`] if the index is taken in that region.
    pub fn insert(&mut self, actor: Actor) -> ActorResult<()> {
        let actors = self.regions.entry(actor.region).or_default();
        if actors.contains_key(&actor.index) {
            return Err(ActorError::DuplicateActor {
                region: actor.region,
                index: actor.index,
            });
        }
        let driver = Arc::clone(actor.motor.driver());
        self.drivers.entry(driver.address()).or_insert(driver);
        actors.insert(actor.index, Arc::new(actor));
        Ok(())
    }

    /// Actor at `(region, index)`.
    pub fn actor(&self, region: Region, index: u32) -> Option<&Arc<Actor>> {
        self.regions.get(&region)?.get(&index)
    }

    /// Like [`actor`](Self::actor), reporting a miss as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::UnknownActor`] if nothing is configured there.
    pub fn find(&self, region: Region, index: u32) -> ActorResult<&Arc<Actor>> {
        self.actor(region, index)
            .ok_or_else(|| ActorError::unknown_actor(region, index))
    }

    /// Actors of `region` by index.
    pub fn region(&self, region: Region) -> Option<&BTreeMap<u32, Arc<Actor>>> {
        self.regions.get(&region)
    }

    /// Configured regions.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.keys().copied()
    }

    /// Every actor.
    pub fn actors(&self) -> impl Iterator<Item = &Arc<Actor>> {
        self.regions.values().flat_map(BTreeMap::values)
    }

    /// Opened drivers.
    pub fn drivers(&self) -> impl Iterator<Item = &Arc<dyn PwmDriver>> {
        self.drivers.values()
    }

    /// Number of opened drivers.
    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// Number of actors.
    pub fn actor_count(&self) -> usize {
        self.regions.values().map(BTreeMap::len).sum()
    }

    /// Switch every outlet of every driver off and withdraw all claims.
    ///
    /// Every driver and motor is attempted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`ActorError::Driver`] encountered.
    pub fn all_off(&self) -> ActorResult<()> {
        let mut first_error = None;

        for driver in self.drivers.values() {
            if let Err(e) = driver.set_all_pwm(0, 0) {
                warn!(address = %driver.address(), error = %e, "failed to switch driver off");
                first_error.get_or_insert(ActorError::from(e));
            }
        }
        for actor in self.actors() {
            if let Err(e) = actor.motor.reset() {
                warn!(region = %actor.region, index = actor.index, error = %e, "failed to reset motor");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

fn open_driver(
    bus: &dyn DriverBus,
    address: DriverAddress,
    pwm_frequency_hz: f32,
) -> ActorResult<Arc<dyn PwmDriver>> {
    if !bus.is_device_answering(address) {
        return Err(ActorError::from(crate::error::DriverError::NotAnswering {
            bus: address.bus,
            address: address.address,
        }));
    }
    let driver = bus.open(address)?;
    driver.set_frequency(pwm_frequency_hz)?;
    Ok(driver)
}
