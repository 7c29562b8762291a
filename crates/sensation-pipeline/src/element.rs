//! Graph building blocks.
//!
//! An [`Element`] is the object-safe unit the graph is wired from. Most
//! elements are a [`Stage`] (a typed per-item transform) wrapped in a
//! [`Node`](crate::node::Node) that owns the successors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::PipelineResult;

/// Shared handle to an element accepting `T`.
pub type ElementRef<T> = Arc<dyn Element<T>>;

/// A vertex of the dataflow graph.
///
/// `set_up` propagates from an element to its successors, `tear_down` from
/// the successors back to the element.
#[async_trait]
pub trait Element<T>: Send + Sync + fmt::Debug
where
    T: Send + 'static,
{
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Process one batch and forward the result downstream.
    async fn process(&self, batch: Vec<T>) -> PipelineResult<()>;

    /// Activate this element and everything below it.
    async fn set_up(&self) -> PipelineResult<()> {
        Ok(())
    }

    /// Deactivate everything below this element, then the element itself.
    async fn tear_down(&self) -> PipelineResult<()> {
        Ok(())
    }
}

/// A typed per-item transform.
///
/// Returning `Ok(None)` from [`process_item`](Stage::process_item) terminates
/// that item only; the rest of the batch continues.
#[async_trait]
pub trait Stage: Send + Sync + fmt::Debug {
    /// Items accepted.
    type Input: Send + 'static;
    /// Items produced; cloned once per successor.
    type Output: Clone + Send + Sync + 'static;

    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Transform one item.
    async fn process_item(&self, item: Self::Input) -> PipelineResult<Option<Self::Output>>;

    /// Transform a batch in order. Failed items are logged and dropped.
    async fn process_batch(&self, batch: Vec<Self::Input>) -> Vec<Self::Output> {
        let mut output = Vec::with_capacity(batch.len());
        for item in batch {
            match self.process_item(item).await {
                Ok(Some(item)) => output.push(item),
                Ok(None) => {}
                Err(e) => warn!(stage = self.name(), error = %e, "dropping item"),
            }
        }
        output
    }

    /// Hook run before any successor is set up.
    async fn set_up(&self) -> PipelineResult<()> {
        Ok(())
    }

    /// Hook run after every successor is torn down.
    async fn tear_down(&self) -> PipelineResult<()> {
        Ok(())
    }
}
