//! Logging pass-through stage.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{Level, debug, error, info, trace, warn};

use crate::element::Stage;
use crate::error::PipelineResult;

/// Logs every item passing through at a configurable level.
pub struct Inspect<T> {
    name: String,
    level: Level,
    _item: PhantomData<fn(T) -> T>,
}

impl<T> Inspect<T> {
    /// Inspector logging at `DEBUG`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::DEBUG,
            _item: PhantomData,
        }
    }

    /// Log at `level` instead.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Level items are logged at.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl<T> fmt::Debug for Inspect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspect")
            .field("name", &self.name)
            .field("level", &self.level)
            .finish()
    }
}

#[async_trait]
impl<T> Stage for Inspect<T>
where
    T: fmt::Debug + Clone + Send + Sync + 'static,
{
    type Input = T;
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    async fn process_item(&self, item: T) -> PipelineResult<Option<T>> {
        let stage = self.name.as_str();
        match self.level {
            Level::ERROR => error!(stage, ?item, "received"),
            Level::WARN => warn!(stage, ?item, "received"),
            Level::INFO => info!(stage, ?item, "received"),
            Level::DEBUG => debug!(stage, ?item, "received"),
            _ => trace!(stage, ?item, "received"),
        }
        Ok(Some(item))
    }
}
