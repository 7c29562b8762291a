//! Wire frame builders.

use sensation_protocol::{LoadPattern, Message, MessageCodec, PlayPattern, Region, Track, Vibration};

use crate::must::must;

/// Encode `message` as a length-prefixed frame.
///
/// # Panics
///
/// Panics if the message cannot be encoded.
#[track_caller]
pub fn frame(message: &Message) -> Vec<u8> {
    must(MessageCodec::new().encode_frame(message))
}

/// Frame of a vibration command.
#[track_caller]
pub fn vibration_frame(region: Region, actor: u32, intensity: f32, priority: i32) -> Vec<u8> {
    frame(&Message::from(
        Vibration::new(region, actor, intensity).with_priority(priority),
    ))
}

/// Frame of a play request.
#[track_caller]
pub fn play_frame(identifier: &str, priority: i32) -> Vec<u8> {
    frame(&Message::from(
        PlayPattern::new(identifier).with_priority(priority),
    ))
}

/// Frame of a pattern load request.
#[track_caller]
pub fn load_frame(identifier: &str, tracks: Vec<Track>) -> Vec<u8> {
    frame(&Message::from(LoadPattern {
        identifier: identifier.to_string(),
        tracks,
    }))
}

/// Frame carrying a raw payload.
pub fn raw_frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = (payload.len() as u32).to_be_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}
