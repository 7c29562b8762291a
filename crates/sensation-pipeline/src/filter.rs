//! Routing by message type.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::element::Stage;
use crate::error::PipelineResult;

/// Items carrying a type tag that a [`TypeFilter`] can route on.
pub trait Tagged {
    /// The tag type.
    type Tag: Copy + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Tag of this item.
    fn tag(&self) -> Self::Tag;
}

/// Passes items whose tag equals the configured one, extracting their
/// type-specific payload. Everything else terminates here.
pub struct TypeFilter<I: Tagged, O> {
    name: String,
    tag: I::Tag,
    extract: fn(I) -> Option<O>,
    _output: PhantomData<fn() -> O>,
}

impl<I: Tagged, O> TypeFilter<I, O> {
    /// Filter for `tag`, using `extract` to pull out the payload.
    pub fn new(name: impl Into<String>, tag: I::Tag, extract: fn(I) -> Option<O>) -> Self {
        Self {
            name: name.into(),
            tag,
            extract,
            _output: PhantomData,
        }
    }

    /// The tag let through.
    pub fn tag(&self) -> I::Tag {
        self.tag
    }
}

impl<I: Tagged, O> fmt::Debug for TypeFilter<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeFilter")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<I, O> Stage for TypeFilter<I, O>
where
    I: Tagged + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    async fn process_item(&self, item: I) -> PipelineResult<Option<O>> {
        let tag = item.tag();
        if tag != self.tag {
            trace!(stage = %self.name, ?tag, "type does not match");
            return Ok(None);
        }
        let payload = (self.extract)(item);
        if payload.is_none() {
            debug!(stage = %self.name, ?tag, "message of matching type carries no payload");
        }
        Ok(payload)
    }
}
