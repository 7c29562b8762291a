//! Wire protocol for the sensation driver.
//!
//! Clients talk to the driver over a plain TCP stream. Each message is framed
//! as a `u32` big-endian payload length followed by a protobuf encoded
//! [`Message`]:
//!
//! ```text
//! +----------------+---------------------------+
//! | len: u32 (BE)  | payload: len bytes        |
//! +----------------+---------------------------+
//! ```
//!
//! # Example
//!
//! ```
//! use sensation_protocol::prelude::*;
//!
//! let codec = MessageCodec::new();
//! let message = Message::from(Vibration::new(Region::LeftHand, 3, 1.0));
//! let frame = codec.encode_frame(&message)?;
//!
//! let mut splitter = Splitter::new(codec.max_frame_size());
//! let (head, tail) = frame.split_at(2);
//! assert!(splitter.push(head)?.is_empty());
//! let frames = splitter.push(tail)?;
//!
//! let decoded = frames
//!     .first()
//!     .map(|payload| codec.decode(payload))
//!     .transpose()?;
//! assert_eq!(decoded, Some(message));
//! # Ok::<(), ProtocolError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod codec;
pub mod error;
pub mod messages;
pub mod prelude;
pub mod splitter;

pub use client::SensationClient;
pub use codec::{DEFAULT_MAX_FRAME_SIZE, LENGTH_PREFIX_SIZE, MessageCodec};
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    DEFAULT_PRIORITY, Keyframe, LoadPattern, Message, MessageType, PlayPattern, Point, Region,
    Track, Vibration,
};
pub use splitter::{Frame, Splitter};
