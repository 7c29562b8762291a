//! Async TCP client for sending commands to a running driver.

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

use crate::codec::MessageCodec;
use crate::error::{ProtocolError, ProtocolResult};
use crate::messages::{LoadPattern, Message, PlayPattern, Region, Track, Vibration};

/// Connection to a sensation driver.
#[derive(Debug)]
pub struct SensationClient {
    stream: TcpStream,
    codec: MessageCodec,
    sent: u64,
}

impl SensationClient {
    /// Connect to the driver at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ConnectionFailed`] if the socket cannot be opened.
    pub async fn connect(addr: impl ToSocketAddrs) -> ProtocolResult<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ProtocolError::ConnectionFailed(e.to_string()))?;
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            codec: MessageCodec::new(),
            sent: 0,
        })
    }

    /// Frame and send one message.
    ///
    /// # Errors
    ///
    /// Fails on encoding or socket errors.
    pub async fn send(&mut self, message: &Message) -> ProtocolResult<()> {
        let frame = self.codec.encode_frame(message)?;
        self.stream.write_all(&frame).await?;
        self.sent += 1;
        debug!(bytes = frame.len(), sent = self.sent, "message sent");
        Ok(())
    }

    /// Request `intensity` on one actor.
    ///
    /// # Errors
    ///
    /// Fails on encoding or socket errors.
    pub async fn vibrate(
        &mut self,
        region: Region,
        actor_index: u32,
        intensity: f32,
        priority: i32,
    ) -> ProtocolResult<()> {
        let vibration = Vibration::new(region, actor_index, intensity).with_priority(priority);
        self.send(&Message::from(vibration)).await
    }

    /// Register a pattern under `identifier`.
    ///
    /// # Errors
    ///
    /// Fails on encoding or socket errors.
    pub async fn load_pattern(
        &mut self,
        identifier: impl Into<String>,
        tracks: Vec<Track>,
    ) -> ProtocolResult<()> {
        let load = LoadPattern {
            identifier: identifier.into(),
            tracks,
        };
        self.send(&Message::from(load)).await
    }

    /// Start a registered pattern.
    ///
    /// # Errors
    ///
    /// Fails on encoding or socket errors.
    pub async fn play_pattern(
        &mut self,
        identifier: impl Into<String>,
        priority: i32,
    ) -> ProtocolResult<()> {
        let play = PlayPattern::new(identifier).with_priority(priority);
        self.send(&Message::from(play)).await
    }

    /// Number of messages sent on this connection.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Flush and close the write half.
    ///
    /// # Errors
    ///
    /// Fails if the shutdown cannot be delivered.
    pub async fn close(mut self) -> ProtocolResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
