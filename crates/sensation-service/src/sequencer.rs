//! Arrival order stamping.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sensation_pipeline::{PipelineResult, Stage, Tagged};
use sensation_protocol::{Message, MessageType};

/// An item together with its position in the global arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<T> {
    /// Strictly increasing across the whole process, starting at 1.
    pub sequence: u64,
    /// The payload.
    pub item: T,
}

impl<T> Sequenced<T> {
    /// Wrap `item`.
    pub fn new(sequence: u64, item: T) -> Self {
        Self { sequence, item }
    }

    /// Replace the payload, keeping the sequence number.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sequenced<U> {
        Sequenced {
            sequence: self.sequence,
            item: f(self.item),
        }
    }
}

impl Tagged for Sequenced<Message> {
    type Tag = MessageType;

    fn tag(&self) -> MessageType {
        self.item.r#type()
    }
}

/// Stamps every message with the next sequence number.
///
/// Messages synthesized by pattern playback pass through the same stage as
/// client messages, so both share one order.
#[derive(Debug)]
pub struct Sequencer {
    next: AtomicU64,
}

impl Sequencer {
    /// Counter starting at 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Number the next message would receive.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for Sequencer {
    type Input = Message;
    type Output = Sequenced<Message>;

    fn name(&self) -> &str {
        "sequencer"
    }

    async fn process_item(&self, item: Message) -> PipelineResult<Option<Sequenced<Message>>> {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed);
        Ok(Some(Sequenced::new(sequence, item)))
    }
}
