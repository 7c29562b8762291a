//! Frame decoding stage.

use async_trait::async_trait;
use sensation_pipeline::{PipelineResult, Stage};
use sensation_protocol::{Frame, Message, MessageCodec};
use tracing::warn;

/// Decodes frames into messages.
///
/// A payload that does not decode is logged and dropped; the connection it
/// came from stays open.
#[derive(Debug, Default)]
pub struct ParseStage {
    codec: MessageCodec,
}

impl ParseStage {
    /// Decode with `codec`.
    pub fn new(codec: MessageCodec) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl Stage for ParseStage {
    type Input = Frame;
    type Output = Message;

    fn name(&self) -> &str {
        "parser"
    }

    async fn process_item(&self, frame: Frame) -> PipelineResult<Option<Message>> {
        match self.codec.decode(&frame) {
            Ok(message) => Ok(Some(message)),
            Err(e) => {
                warn!(error = %e, bytes = frame.len(), "dropping malformed message");
                Ok(None)
            }
        }
    }
}
