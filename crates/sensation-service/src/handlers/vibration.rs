//! Applies vibration commands to motors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sensation_actors::{ActorError, SENSITIVITY, Topology};
use sensation_pipeline::{PipelineError, PipelineResult, Stage};
use sensation_protocol::{Region, Vibration};
use tracing::{debug, trace, warn};

use crate::sequencer::Sequenced;

/// Sequence numbers applied to one actor.
///
/// Only priorities with a live claim keep their own entry. Withdrawing a
/// claim folds its sequence into `withdrawn`, which then bounds every
/// priority without an entry, so the map never outgrows the claims the
/// motor holds.
#[derive(Debug, Default)]
struct AppliedSequences {
    live: HashMap<i32, u64>,
    withdrawn: u64,
}

impl AppliedSequences {
    fn is_stale(&self, priority: i32, sequence: u64) -> bool {
        let last = self.live.get(&priority).copied().unwrap_or(self.withdrawn);
        sequence <= last
    }

    fn record(&mut self, priority: i32, sequence: u64, intensity: f32) {
        if intensity < SENSITIVITY {
            self.live.remove(&priority);
            self.withdrawn = self.withdrawn.max(sequence);
        } else {
            self.live.insert(priority, sequence);
        }
    }
}

/// Routes vibration commands to the addressed motor.
///
/// Per `(region, actor, priority)` the highest applied sequence number is
/// remembered; commands that arrive with a lower or equal number are stale
/// and dropped. Different actors never shadow each other. Once a claim is
/// withdrawn, commands older than the withdrawal are stale at every priority
/// of that actor without a live claim.
#[derive(Debug)]
pub struct VibrationHandler {
    topology: Arc<Topology>,
    applied: Mutex<HashMap<(Region, u32), AppliedSequences>>,
}

impl VibrationHandler {
    /// Handler for the actors in `topology`.
    pub fn new(topology: Arc<Topology>) -> Self {
        Self {
            topology,
            applied: Mutex::new(HashMap::new()),
        }
    }

    /// The actor topology.
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Highest sequence number applied to a live claim, if any.
    pub fn last_applied(&self, region: Region, actor_index: u32, priority: i32) -> Option<u64> {
        self.applied
            .lock()
            .get(&(region, actor_index))?
            .live
            .get(&priority)
            .copied()
    }

    /// Number of priorities remembered for an actor.
    pub fn tracked_priorities(&self, region: Region, actor_index: u32) -> usize {
        self.applied
            .lock()
            .get(&(region, actor_index))
            .map_or(0, |applied| applied.live.len())
    }
}

#[async_trait]
impl Stage for VibrationHandler {
    type Input = Sequenced<Vibration>;
    type Output = Sequenced<Vibration>;

    fn name(&self) -> &str {
        "vibration-handler"
    }

    async fn process_item(
        &self,
        command: Sequenced<Vibration>,
    ) -> PipelineResult<Option<Sequenced<Vibration>>> {
        let vibration = &command.item;
        let priority = vibration.priority();

        let Ok(region) = Region::try_from(vibration.target_region) else {
            warn!(
                region = vibration.target_region,
                actor = vibration.actor_index,
                "Vibration for unknown region - ignoring command"
            );
            return Ok(None);
        };
        let actor = match self.topology.find(region, vibration.actor_index) {
            Ok(actor) => actor,
            Err(e) => {
                warn!(error = %e, "Vibration for unconfigured actor - ignoring command");
                return Ok(None);
            }
        };

        let mut applied = self.applied.lock();
        let sequences = applied.entry((region, vibration.actor_index)).or_default();
        if sequences.is_stale(priority, command.sequence) {
            trace!(
                %region,
                actor = vibration.actor_index,
                priority,
                sequence = command.sequence,
                "stale command"
            );
            return Ok(None);
        }

        match actor.motor.set_intensity(vibration.intensity, priority) {
            Ok(()) => {
                sequences.record(priority, command.sequence, vibration.intensity);
                Ok(Some(command))
            }
            Err(ActorError::Driver(e)) => {
                // The motor kept the attempted output, so the claim counts as applied.
                sequences.record(priority, command.sequence, vibration.intensity);
                warn!(%region, actor = vibration.actor_index, error = %e, "driver write failed");
                Ok(None)
            }
            Err(ActorError::InvalidIntensity(intensity)) => {
                warn!(
                    %region,
                    actor = vibration.actor_index,
                    intensity,
                    "Intensity not in interval [0, 1] - ignoring command"
                );
                Ok(None)
            }
            Err(e) => Err(PipelineError::stage_failed(self.name(), e)),
        }
    }

    async fn set_up(&self) -> PipelineResult<()> {
        debug!(actors = self.topology.actor_count(), "switching all actors off");
        self.applied.lock().clear();
        self.topology
            .all_off()
            .map_err(|e| PipelineError::set_up_failed(self.name(), e))
    }

    async fn tear_down(&self) -> PipelineResult<()> {
        self.applied.lock().clear();
        self.topology
            .all_off()
            .map_err(|e| PipelineError::stage_failed(self.name(), e))
    }
}
