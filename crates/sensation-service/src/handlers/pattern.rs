//! Pattern registry and playback.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use sensation_pipeline::{Element, Inlet};
use sensation_protocol::{LoadPattern, Message, PlayPattern};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::error::ServiceResult;
use crate::track::{PatternTemplate, PatternTrack};

/// Keeps loaded patterns and plays them back.
///
/// Playback samples every track at a fixed interval and feeds the resulting
/// vibration commands back into the graph through a [`Inlet`], so they are
/// sequenced and arbitrated exactly like client commands.
pub struct PatternHandler {
    registry: RwLock<HashMap<String, Arc<PatternTemplate>>>,
    inlet: Weak<Inlet<Message>>,
    interval: Duration,
}

impl PatternHandler {
    /// Handler emitting into `inlet` every `interval`.
    pub fn new(inlet: Weak<Inlet<Message>>, interval: Duration) -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            inlet,
            interval,
        }
    }

    /// Validate and store a pattern, replacing one with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidPattern`](crate::ServiceError::InvalidPattern)
    /// if any track is invalid; the registry is left unchanged.
    pub fn load(&self, request: LoadPattern) -> ServiceResult<()> {
        let template = PatternTemplate::from_wire(&request.identifier, &request.tracks)?;
        info!(
            pattern = %template.identifier,
            tracks = template.tracks.len(),
            duration = template.duration(),
            "pattern loaded"
        );
        self.registry
            .write()
            .insert(request.identifier, Arc::new(template));
        Ok(())
    }

    /// Registered pattern by identifier.
    pub fn pattern(&self, identifier: &str) -> Option<Arc<PatternTemplate>> {
        self.registry.read().get(identifier).cloned()
    }

    /// Number of registered patterns.
    pub fn pattern_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Play a registered pattern to its end.
    ///
    /// Every iteration advances each track by the time that actually passed
    /// since the previous one, emits one command per track and drops the
    /// tracks that have finished. Returns the number of commands emitted.
    ///
    /// # Errors
    ///
    /// Fails if the graph rejects an emitted batch.
    pub async fn play(&self, request: PlayPattern) -> ServiceResult<usize> {
        let priority = request.priority();
        let Some(template) = self.pattern(&request.identifier) else {
            warn!(pattern = %request.identifier, "Unknown pattern - ignoring play request");
            return Ok(0);
        };

        let mut tracks: Vec<PatternTrack> = template
            .tracks
            .iter()
            .map(|track| PatternTrack::new(track, priority))
            .collect();
        debug!(pattern = %template.identifier, priority, tracks = tracks.len(), "playing pattern");

        let mut emitted = 0;
        let mut delta = 0.0;
        let mut previous = Instant::now();

        while !tracks.is_empty() {
            for track in &mut tracks {
                track.advance(delta);
            }
            let batch: Vec<Message> = tracks.iter().map(PatternTrack::create_message).collect();

            let Some(inlet) = self.inlet.upgrade() else {
                debug!(pattern = %template.identifier, "graph is gone, stopping playback");
                break;
            };
            emitted += batch.len();
            inlet.process(batch).await?;
            drop(inlet);

            tracks.retain(|track| !track.is_finished());
            if tracks.is_empty() {
                break;
            }

            sleep(self.interval).await;
            let now = Instant::now();
            delta = now.duration_since(previous).as_secs_f32();
            previous = now;
        }

        debug!(pattern = %template.identifier, emitted, "pattern finished");
        Ok(emitted)
    }
}

impl fmt::Debug for PatternHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternHandler")
            .field("patterns", &self.pattern_count())
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
