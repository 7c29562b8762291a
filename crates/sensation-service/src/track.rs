//! Pattern templates and their playing instances.

use sensation_curves::{BezierPath, Timeline, ValueRange};
use sensation_protocol::{Message, Region, Track, Vibration};

use crate::error::{ServiceError, ServiceResult};

/// Validated curve for one actor, as stored in the registry.
#[derive(Debug, Clone)]
pub struct TrackTemplate {
    /// Region of the driven actor.
    pub region: Region,
    /// Index of the driven actor.
    pub actor_index: u32,
    /// The curve.
    pub path: BezierPath,
    /// Values the curve reaches, used to rescale its output.
    pub range: ValueRange,
}

impl TrackTemplate {
    /// Validate a wire track.
    ///
    /// # Errors
    ///
    /// Fails on an unknown region or an invalid keyframe sequence. The
    /// error's identifier is left empty for the caller to fill in.
    pub fn from_wire(track: &Track) -> ServiceResult<Self> {
        let region = Region::try_from(track.target_region).map_err(|_unknown| {
            ServiceError::invalid_pattern(
                "",
                format!("unknown region {}", track.target_region),
            )
        })?;
        let keyframes = track
            .curve_keyframes()
            .map_err(|e| ServiceError::invalid_pattern("", e))?;
        let path = BezierPath::new(keyframes).map_err(|e| ServiceError::invalid_pattern("", e))?;
        let range = path.bounding_box();

        Ok(Self {
            region,
            actor_index: track.actor_index,
            path,
            range,
        })
    }
}

/// A named, immutable set of track templates.
#[derive(Debug, Clone)]
pub struct PatternTemplate {
    /// Registry key.
    pub identifier: String,
    /// One template per driven actor.
    pub tracks: Vec<TrackTemplate>,
}

impl PatternTemplate {
    /// Validate every track of a load request.
    ///
    /// # Errors
    ///
    /// Rejects the whole pattern if any track is invalid.
    pub fn from_wire(identifier: &str, tracks: &[Track]) -> ServiceResult<Self> {
        let tracks = tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                TrackTemplate::from_wire(track).map_err(|e| match e {
                    ServiceError::InvalidPattern { reason, .. } => ServiceError::invalid_pattern(
                        identifier,
                        format!("track {index}: {reason}"),
                    ),
                    other => other,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Self {
            identifier: identifier.to_string(),
            tracks,
        })
    }

    /// Longest track duration in seconds.
    pub fn duration(&self) -> f32 {
        self.tracks
            .iter()
            .map(|t| t.path.duration())
            .fold(0.0, f32::max)
    }
}

/// One track of a playing pattern.
#[derive(Debug, Clone)]
pub struct PatternTrack {
    region: Region,
    actor_index: u32,
    priority: i32,
    range: ValueRange,
    timeline: Timeline,
}

impl PatternTrack {
    /// Start playing `template` at `priority`.
    pub fn new(template: &TrackTemplate, priority: i32) -> Self {
        Self {
            region: template.region,
            actor_index: template.actor_index,
            priority,
            range: template.range,
            timeline: template.path.timeline(),
        }
    }

    /// Advance by `delta` seconds and return the rescaled intensity.
    pub fn advance(&mut self, delta: f32) -> f32 {
        self.range.normalize(self.timeline.advance(delta))
    }

    /// Rescaled intensity at the current position.
    pub fn value(&self) -> f32 {
        self.range.normalize(self.timeline.value())
    }

    /// Whether the curve has been played to its end.
    pub fn is_finished(&self) -> bool {
        self.timeline.is_finished()
    }

    /// Target region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Target actor index.
    pub fn actor_index(&self) -> u32 {
        self.actor_index
    }

    /// Priority bound at play time.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Vibration command carrying the current value.
    pub fn create_message(&self) -> Message {
        Message::from(
            Vibration::new(self.region, self.actor_index, self.value())
                .with_priority(self.priority),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sensation_protocol::{Keyframe, MessageType, Point};

    fn must<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
        match result {
            Ok(v) => v,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }

    fn key(time: f32, value: f32) -> Keyframe {
        Keyframe {
            control_point: Some(Point { time, value }),
            in_tangent_start: None,
            out_tangent_end: None,
        }
    }

    fn ramp(from: f32, to: f32) -> Track {
        Track {
            target_region: Region::LeftHand as i32,
            actor_index: 3,
            keyframes: vec![key(0.0, from), key(1.0, to)],
        }
    }

    #[test]
    fn test_output_is_rescaled_into_unit_range() {
        let template = must(TrackTemplate::from_wire(&ramp(2.0, 6.0)));
        assert_relative_eq!(template.range.min, 2.0);
        assert_relative_eq!(template.range.max, 6.0);

        let mut track = PatternTrack::new(&template, 150);
        assert_relative_eq!(track.value(), 0.0);
        assert_relative_eq!(track.advance(0.5), 0.5, epsilon = 1e-5);
        assert!(!track.is_finished());

        assert_relative_eq!(track.advance(1.0), 1.0);
        assert!(track.is_finished());
    }

    #[test]
    fn test_flat_curve_is_clamped() {
        let template = must(TrackTemplate::from_wire(&ramp(0.4, 0.4)));
        let mut track = PatternTrack::new(&template, 100);
        assert_relative_eq!(track.advance(0.5), 0.4);
    }

    #[test]
    fn test_message_carries_address_and_priority() {
        let template = must(TrackTemplate::from_wire(&ramp(0.0, 1.0)));
        let mut track = PatternTrack::new(&template, 150);
        track.advance(2.0);

        let message = track.create_message();
        assert_eq!(message.r#type(), MessageType::Vibration);
        let vibration = match message.vibration {
            Some(v) => v,
            None => panic!("vibration payload missing"),
        };
        assert_eq!(vibration.target_region(), Region::LeftHand);
        assert_eq!(vibration.actor_index, 3);
        assert_eq!(vibration.priority(), 150);
        assert_relative_eq!(vibration.intensity, 1.0);
    }

    #[test]
    fn test_invalid_tracks_reject_the_pattern() {
        let mut short = ramp(0.0, 1.0);
        short.keyframes.truncate(1);
        let mut bad_region = ramp(0.0, 1.0);
        bad_region.target_region = 99;
        let mut no_control_point = ramp(0.0, 1.0);
        if let Some(last) = no_control_point.keyframes.last_mut() {
            last.control_point = None;
        }

        for track in [short, bad_region, no_control_point] {
            match PatternTemplate::from_wire("wave", &[ramp(0.0, 1.0), track]) {
                Err(ServiceError::InvalidPattern { identifier, reason }) => {
                    assert_eq!(identifier, "wave");
                    assert!(reason.starts_with("track 1:"), "{reason}");
                }
                other => panic!("expected rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_duration_is_longest_track() {
        let mut long = ramp(0.0, 1.0);
        long.keyframes.push(key(3.0, 0.0));
        let pattern = must(PatternTemplate::from_wire("wave", &[ramp(0.0, 1.0), long]));
        assert_relative_eq!(pattern.duration(), 3.0);
    }
}
