//! Message encoding and decoding

use prost::Message as _;

use crate::error::{ProtocolError, ProtocolResult};
use crate::messages::Message;
use crate::splitter::Splitter;

/// Bytes in the big-endian length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload accepted by default.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Message codec for encoding and decoding wire messages
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    /// Maximum payload size in bytes
    max_frame_size: usize,
}

impl MessageCodec {
    /// Create a new codec with default settings
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with custom max payload size
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Get the maximum payload size
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Check if a payload size is acceptable
    pub fn is_valid_size(&self, size: usize) -> bool {
        size <= self.max_frame_size
    }

    /// A splitter enforcing this codec's size limit.
    pub fn splitter(&self) -> Splitter {
        Splitter::new(self.max_frame_size)
    }

    /// Encode a message payload without its length prefix.
    ///
    /// # Errors
    ///
    /// Fails if the encoded message exceeds the maximum frame size.
    pub fn encode(&self, message: &Message) -> ProtocolResult<Vec<u8>> {
        let encoded_len = message.encoded_len();
        if !self.is_valid_size(encoded_len) {
            return Err(ProtocolError::EncodingFailed(format!(
                "Message size {} exceeds maximum {}",
                encoded_len, self.max_frame_size
            )));
        }

        let mut buffer = Vec::with_capacity(encoded_len);
        message
            .encode(&mut buffer)
            .map_err(|e| ProtocolError::EncodingFailed(e.to_string()))?;
        Ok(buffer)
    }

    /// Encode a message as a complete length-prefixed frame.
    ///
    /// # Errors
    ///
    /// Fails if the encoded message exceeds the maximum frame size.
    pub fn encode_frame(&self, message: &Message) -> ProtocolResult<Vec<u8>> {
        let payload = self.encode(message)?;
        let len = u32::try_from(payload.len()).map_err(|_| {
            ProtocolError::EncodingFailed(format!(
                "Message size {} does not fit the length prefix",
                payload.len()
            ))
        })?;

        let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode one frame payload.
    ///
    /// An empty payload decodes to the default message.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::DecodingFailed`] for oversized or malformed payloads.
    pub fn decode(&self, payload: &[u8]) -> ProtocolResult<Message> {
        if !self.is_valid_size(payload.len()) {
            return Err(ProtocolError::DecodingFailed(format!(
                "Message size {} exceeds maximum {}",
                payload.len(),
                self.max_frame_size
            )));
        }

        Message::decode(payload).map_err(|e| ProtocolError::DecodingFailed(e.to_string()))
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{MessageType, PlayPattern, Region, Vibration};

    fn must<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
        match result {
            Ok(v) => v,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_frame_prefix_matches_payload_length() {
        let codec = MessageCodec::new();
        let message = Message::from(Vibration::new(Region::LeftHand, 3, 1.0).with_priority(100));
        let frame = must(codec.encode_frame(&message));
        let payload = must(codec.encode(&message));

        assert_eq!(frame.len(), LENGTH_PREFIX_SIZE + payload.len());
        assert_eq!(frame[..4], (payload.len() as u32).to_be_bytes());
        assert_eq!(frame[4..], payload[..]);
    }

    #[test]
    fn test_decode_garbage_is_recoverable() {
        let codec = MessageCodec::new();
        let err = codec.decode(&[0xff, 0xff, 0xff]);
        match err {
            Err(e) => assert!(e.is_recoverable()),
            Ok(m) => panic!("garbage decoded to {m:?}"),
        }
    }

    #[test]
    fn test_empty_payload_decodes_to_default() {
        let codec = MessageCodec::new();
        let message = must(codec.decode(&[]));
        assert_eq!(message.r#type(), MessageType::Vibration);
        assert!(message.vibration.is_none());
    }

    #[test]
    fn test_encode_rejects_oversized() {
        let codec = MessageCodec::with_max_size(4);
        let message = Message::from(PlayPattern::new("a pattern name longer than four bytes"));
        assert!(matches!(
            codec.encode(&message),
            Err(ProtocolError::EncodingFailed(_))
        ));
    }

    #[test]
    fn test_splitter_inherits_limit() {
        let codec = MessageCodec::with_max_size(2);
        let mut splitter = codec.splitter();
        assert!(matches!(
            splitter.push(&[0, 0, 0, 3]),
            Err(ProtocolError::FrameTooLarge { size: 3, max: 2 })
        ));
    }
}
