//! Protobuf schema of the messages clients send.
//!
//! The types mirror this schema:
//!
//! ```text
//! message Message {
//!   MessageType type = 1;
//!   Vibration vibration = 2;
//!   LoadPattern load_pattern = 3;
//!   PlayPattern play_pattern = 4;
//! }
//! message Vibration   { Region target_region = 1; uint32 actor_index = 2; float intensity = 3; optional int32 priority = 4 [default = 100]; }
//! message LoadPattern { string identifier = 1; repeated Track tracks = 2; }
//! message PlayPattern { string identifier = 1; optional int32 priority = 2 [default = 100]; }
//! message Track       { Region target_region = 1; uint32 actor_index = 2; repeated Keyframe keyframes = 3; }
//! message Keyframe    { Point control_point = 1; Point in_tangent_start = 2; Point out_tangent_end = 3; }
//! message Point       { float time = 1; float value = 2; }
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, ProtocolResult};

/// Priority used when a command does not carry one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Selects which payload field of a [`Message`] is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    /// Direct intensity command for one actor.
    Vibration = 0,
    /// Register a named pattern.
    LoadPattern = 1,
    /// Start playing a registered pattern.
    PlayPattern = 2,
}

/// Physical body zone an actor is mounted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Region {
    /// Left hand
    LeftHand = 0,
    /// Left forearm
    LeftForearm = 1,
    /// Left upper arm
    LeftUpperArm = 2,
    /// Right hand
    RightHand = 3,
    /// Right forearm
    RightForearm = 4,
    /// Right upper arm
    RightUpperArm = 5,
    /// Chest
    Chest = 6,
    /// Back
    Back = 7,
    /// Hip
    Hip = 8,
    /// Left thigh
    LeftThigh = 9,
    /// Left shin
    LeftShin = 10,
    /// Left foot
    LeftFoot = 11,
    /// Right thigh
    RightThigh = 12,
    /// Right shin
    RightShin = 13,
    /// Right foot
    RightFoot = 14,
    /// Head
    Head = 15,
}

impl Region {
    /// Every region in schema order.
    pub const ALL: [Region; 16] = [
        Region::LeftHand,
        Region::LeftForearm,
        Region::LeftUpperArm,
        Region::RightHand,
        Region::RightForearm,
        Region::RightUpperArm,
        Region::Chest,
        Region::Back,
        Region::Hip,
        Region::LeftThigh,
        Region::LeftShin,
        Region::LeftFoot,
        Region::RightThigh,
        Region::RightShin,
        Region::RightFoot,
        Region::Head,
    ];

    /// Name used in the schema and in actor configuration files.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Region::LeftHand => "LEFT_HAND",
            Region::LeftForearm => "LEFT_FOREARM",
            Region::LeftUpperArm => "LEFT_UPPER_ARM",
            Region::RightHand => "RIGHT_HAND",
            Region::RightForearm => "RIGHT_FOREARM",
            Region::RightUpperArm => "RIGHT_UPPER_ARM",
            Region::Chest => "CHEST",
            Region::Back => "BACK",
            Region::Hip => "HIP",
            Region::LeftThigh => "LEFT_THIGH",
            Region::LeftShin => "LEFT_SHIN",
            Region::LeftFoot => "LEFT_FOOT",
            Region::RightThigh => "RIGHT_THIGH",
            Region::RightShin => "RIGHT_SHIN",
            Region::RightFoot => "RIGHT_FOOT",
            Region::Head => "HEAD",
        }
    }

    /// Look a region up by its schema name.
    pub fn from_str_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|region| region.as_str_name() == name)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str_name())
    }
}

impl FromStr for Region {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_name(s).ok_or_else(|| ProtocolError::UnknownRegion(s.to_string()))
    }
}

/// Top level wire message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    /// Which payload is set.
    #[prost(enumeration = "MessageType", tag = "1")]
    pub r#type: i32,
    /// Payload for [`MessageType::Vibration`].
    #[prost(message, optional, tag = "2")]
    pub vibration: Option<Vibration>,
    /// Payload for [`MessageType::LoadPattern`].
    #[prost(message, optional, tag = "3")]
    pub load_pattern: Option<LoadPattern>,
    /// Payload for [`MessageType::PlayPattern`].
    #[prost(message, optional, tag = "4")]
    pub play_pattern: Option<PlayPattern>,
}

impl From<Vibration> for Message {
    fn from(vibration: Vibration) -> Self {
        Self {
            r#type: MessageType::Vibration as i32,
            vibration: Some(vibration),
            ..Self::default()
        }
    }
}

impl From<LoadPattern> for Message {
    fn from(load_pattern: LoadPattern) -> Self {
        Self {
            r#type: MessageType::LoadPattern as i32,
            load_pattern: Some(load_pattern),
            ..Self::default()
        }
    }
}

impl From<PlayPattern> for Message {
    fn from(play_pattern: PlayPattern) -> Self {
        Self {
            r#type: MessageType::PlayPattern as i32,
            play_pattern: Some(play_pattern),
            ..Self::default()
        }
    }
}

/// Intensity command for a single actor.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Vibration {
    /// Region the actor belongs to.
    #[prost(enumeration = "Region", tag = "1")]
    pub target_region: i32,
    /// Index of the actor inside its region.
    #[prost(uint32, tag = "2")]
    pub actor_index: u32,
    /// Requested intensity in `[0, 1]`.
    #[prost(float, tag = "3")]
    pub intensity: f32,
    /// Arbitration priority; higher wins.
    #[prost(int32, optional, tag = "4", default = "100")]
    pub priority: Option<i32>,
}

impl Vibration {
    /// Command at the default priority.
    pub fn new(region: Region, actor_index: u32, intensity: f32) -> Self {
        Self {
            target_region: region as i32,
            actor_index,
            intensity,
            priority: None,
        }
    }

    /// Set an explicit priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Registers a pattern under `identifier`, replacing any previous one.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoadPattern {
    /// Pattern name.
    #[prost(string, tag = "1")]
    pub identifier: String,
    /// One track per driven actor.
    #[prost(message, repeated, tag = "2")]
    pub tracks: Vec<Track>,
}

/// Starts playback of a registered pattern.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlayPattern {
    /// Pattern name.
    #[prost(string, tag = "1")]
    pub identifier: String,
    /// Priority bound to every generated command.
    #[prost(int32, optional, tag = "2", default = "100")]
    pub priority: Option<i32>,
}

impl PlayPattern {
    /// Play request at the default priority.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            priority: None,
        }
    }

    /// Set an explicit priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Keyframed intensity curve for one actor.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Track {
    /// Region the actor belongs to.
    #[prost(enumeration = "Region", tag = "1")]
    pub target_region: i32,
    /// Index of the actor inside its region.
    #[prost(uint32, tag = "2")]
    pub actor_index: u32,
    /// Curve keyframes in time order.
    #[prost(message, repeated, tag = "3")]
    pub keyframes: Vec<Keyframe>,
}

impl Track {
    /// Keyframes converted for curve evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::DecodingFailed`] naming the first keyframe
    /// without a control point.
    pub fn curve_keyframes(&self) -> ProtocolResult<Vec<sensation_curves::Keyframe>> {
        self.keyframes
            .iter()
            .enumerate()
            .map(|(index, keyframe)| {
                sensation_curves::Keyframe::try_from(keyframe).map_err(|_missing| {
                    ProtocolError::DecodingFailed(format!("keyframe {index} has no control point"))
                })
            })
            .collect()
    }
}

/// Wire keyframe.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Keyframe {
    /// The point the curve passes through.
    #[prost(message, optional, tag = "1")]
    pub control_point: Option<Point>,
    /// Handle shaping the segment ending here.
    #[prost(message, optional, tag = "2")]
    pub in_tangent_start: Option<Point>,
    /// Handle shaping the segment starting here.
    #[prost(message, optional, tag = "3")]
    pub out_tangent_end: Option<Point>,
}

/// Wire control point.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Point {
    /// Seconds since pattern start.
    #[prost(float, tag = "1")]
    pub time: f32,
    /// Curve value.
    #[prost(float, tag = "2")]
    pub value: f32,
}

impl From<&Point> for sensation_curves::Point {
    fn from(point: &Point) -> Self {
        sensation_curves::Point::new(point.time, point.value)
    }
}

impl From<sensation_curves::Point> for Point {
    fn from(point: sensation_curves::Point) -> Self {
        Point {
            time: point.time,
            value: point.value,
        }
    }
}

impl TryFrom<&Keyframe> for sensation_curves::Keyframe {
    type Error = ProtocolError;

    fn try_from(keyframe: &Keyframe) -> Result<Self, Self::Error> {
        let control_point = keyframe.control_point.as_ref().ok_or_else(|| {
            ProtocolError::DecodingFailed("missing control point".to_string())
        })?;
        Ok(sensation_curves::Keyframe {
            control_point: control_point.into(),
            in_tangent: keyframe
                .in_tangent_start
                .as_ref()
                .map(sensation_curves::Point::from),
            out_tangent: keyframe
                .out_tangent_end
                .as_ref()
                .map(sensation_curves::Point::from),
        })
    }
}

impl From<sensation_curves::Keyframe> for Keyframe {
    fn from(keyframe: sensation_curves::Keyframe) -> Self {
        Keyframe {
            control_point: Some(keyframe.control_point.into()),
            in_tangent_start: keyframe.in_tangent.map(Point::from),
            out_tangent_end: keyframe.out_tangent.map(Point::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    fn must<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
        match result {
            Ok(v) => v,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_region_names_round_trip() {
        for region in Region::ALL {
            assert_eq!(Region::from_str_name(region.as_str_name()), Some(region));
        }
        assert_eq!(Region::from_str_name("ELBOW"), None);
    }

    #[test]
    fn test_region_from_str_error() {
        let err = "left_hand".parse::<Region>();
        assert!(matches!(err, Err(ProtocolError::UnknownRegion(_))));
        assert_eq!(must("CHEST".parse::<Region>()), Region::Chest);
    }

    #[test]
    fn test_missing_priority_reads_as_default() {
        let vibration = Vibration::new(Region::Back, 2, 0.5);
        assert_eq!(vibration.priority(), DEFAULT_PRIORITY);
        assert_eq!(vibration.with_priority(7).priority(), 7);
        assert_eq!(PlayPattern::new("pulse").priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn test_explicit_zero_priority_survives_encoding() {
        let message = Message::from(Vibration::new(Region::Chest, 3, 0.9).with_priority(0));
        let decoded = must(Message::decode(message.encode_to_vec().as_slice()));
        let vibration = must_vibration(&decoded);
        assert_eq!(vibration.priority(), 0);
    }

    #[test]
    fn test_enum_accessors() {
        let message = Message::from(PlayPattern::new("wave"));
        assert_eq!(message.r#type(), MessageType::PlayPattern);
        let vibration = Vibration::new(Region::RightFoot, 0, 1.0);
        assert_eq!(vibration.target_region(), Region::RightFoot);
    }

    #[test]
    fn test_keyframe_without_tangents_converts() {
        let wire = Keyframe {
            control_point: Some(Point {
                time: 0.5,
                value: 0.25,
            }),
            in_tangent_start: None,
            out_tangent_end: None,
        };
        let curve = must(sensation_curves::Keyframe::try_from(&wire));
        assert_eq!(curve.control_point, sensation_curves::Point::new(0.5, 0.25));
        assert_eq!(curve.in_tangent, None);
        assert_eq!(Keyframe::from(curve), wire);
    }

    #[test]
    fn test_keyframe_without_control_point_is_rejected() {
        let track = Track {
            target_region: Region::Back as i32,
            actor_index: 0,
            keyframes: vec![
                Keyframe::from(sensation_curves::Keyframe::new(sensation_curves::Point::new(0.0, 0.0))),
                Keyframe {
                    control_point: None,
                    in_tangent_start: Some(Point {
                        time: 0.5,
                        value: 1.0,
                    }),
                    out_tangent_end: None,
                },
            ],
        };

        match track.curve_keyframes() {
            Err(ProtocolError::DecodingFailed(reason)) => {
                assert!(reason.contains("keyframe 1"), "{reason}");
            }
            other => panic!("expected a decoding error, got {other:?}"),
        }
    }

    fn must_vibration(message: &Message) -> &Vibration {
        match message.vibration.as_ref() {
            Some(v) => v,
            None => panic!("message carries no vibration payload"),
        }
    }
}
