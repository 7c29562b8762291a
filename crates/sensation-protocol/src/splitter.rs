//! Reassembly of length-prefixed frames from a byte stream.

use tracing::trace;

use crate::codec::LENGTH_PREFIX_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// One complete payload, without its length prefix.
pub type Frame = Vec<u8>;

/// Stateful accumulator turning arbitrary chunks into complete frames.
///
/// A frame or its length prefix may arrive split across any number of
/// chunks, including empty ones. Each connection owns its own splitter.
#[derive(Debug, Clone)]
pub struct Splitter {
    buffer: Vec<u8>,
    /// Size announced by the last consumed length prefix.
    pending: Option<usize>,
    max_frame_size: usize,
}

impl Splitter {
    /// Create a splitter rejecting frames above `max_frame_size` bytes.
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            pending: None,
            max_frame_size,
        }
    }

    /// Append `chunk` and return every frame completed by it, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::FrameTooLarge`] when a length prefix exceeds
    /// the configured maximum. The splitter is reset because the stream can
    /// no longer be trusted.
    pub fn push(&mut self, chunk: &[u8]) -> ProtocolResult<Vec<Frame>> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut consumed = 0usize;

        loop {
            match self.pending {
                None => {
                    let Some(prefix) = self
                        .buffer
                        .get(consumed..consumed + LENGTH_PREFIX_SIZE)
                        .and_then(|bytes| <[u8; LENGTH_PREFIX_SIZE]>::try_from(bytes).ok())
                    else {
                        break;
                    };

                    let size = u32::from_be_bytes(prefix) as usize;
                    if size > self.max_frame_size {
                        let max = self.max_frame_size;
                        self.reset();
                        return Err(ProtocolError::frame_too_large(size, max));
                    }

                    consumed += LENGTH_PREFIX_SIZE;
                    self.pending = Some(size);
                }
                Some(size) => {
                    let Some(payload) = self.buffer.get(consumed..consumed + size) else {
                        break;
                    };

                    frames.push(payload.to_vec());
                    consumed += size;
                    self.pending = None;
                }
            }
        }

        self.buffer.drain(..consumed);
        if !frames.is_empty() {
            trace!(
                frames = frames.len(),
                retained = self.buffer.len(),
                "frames reassembled"
            );
        }

        Ok(frames)
    }

    /// Size of the frame currently being collected, if its prefix has arrived.
    pub fn pending_size(&self) -> Option<usize> {
        self.pending
    }

    /// Bytes held back waiting for the rest of a prefix or payload.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all partial state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending = None;
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(crate::codec::DEFAULT_MAX_FRAME_SIZE)
    }
}
