//! Prelude for protocol users.

pub use crate::client::SensationClient;
pub use crate::codec::MessageCodec;
pub use crate::error::{ProtocolError, ProtocolResult};
pub use crate::messages::{
    DEFAULT_PRIORITY, Keyframe, LoadPattern, Message, MessageType, PlayPattern, Point, Region,
    Track, Vibration,
};
pub use crate::splitter::{Frame, Splitter};
