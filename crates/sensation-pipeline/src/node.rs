//! Stage nodes and late-bound inlets.

use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{trace, warn};

use crate::element::{Element, ElementRef, Stage};
use crate::error::{PipelineError, PipelineResult};

/// A [`Stage`] together with the elements its output is forwarded to.
///
/// Every successor receives its own copy of the transformed batch. An empty
/// batch is not forwarded.
pub struct Node<S: Stage> {
    stage: S,
    successors: Vec<ElementRef<S::Output>>,
}

impl<S: Stage> Node<S> {
    /// Node without successors.
    pub fn new(stage: S) -> Self {
        Self {
            stage,
            successors: Vec::new(),
        }
    }

    /// Append a successor.
    #[must_use]
    pub fn with_successor(mut self, successor: ElementRef<S::Output>) -> Self {
        self.successors.push(successor);
        self
    }

    /// Append several successors.
    #[must_use]
    pub fn with_successors(
        mut self,
        successors: impl IntoIterator<Item = ElementRef<S::Output>>,
    ) -> Self {
        self.successors.extend(successors);
        self
    }

    /// The wrapped stage.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Number of successors.
    pub fn successor_count(&self) -> usize {
        self.successors.len()
    }
}

impl<S: Stage> fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("stage", &self.stage)
            .field("successors", &self.successors.len())
            .finish()
    }
}

#[async_trait]
impl<S: Stage> Element<S::Input> for Node<S> {
    fn name(&self) -> &str {
        self.stage.name()
    }

    async fn process(&self, batch: Vec<S::Input>) -> PipelineResult<()> {
        let output = self.stage.process_batch(batch).await;
        if output.is_empty() {
            return Ok(());
        }
        forward(self.stage.name(), &self.successors, output).await
    }

    async fn set_up(&self) -> PipelineResult<()> {
        self.stage.set_up().await?;
        for successor in &self.successors {
            successor.set_up().await?;
        }
        Ok(())
    }

    async fn tear_down(&self) -> PipelineResult<()> {
        let mut result = tear_down_all(&self.successors).await;
        if let Err(e) = self.stage.tear_down().await {
            warn!(stage = self.stage.name(), error = %e, "tear-down failed");
            result = result.and(Err(e));
        }
        result
    }
}

/// Send a copy of `batch` to every successor.
///
/// Every successor is attempted; the first error is returned.
pub(crate) async fn forward<T>(
    from: &str,
    successors: &[ElementRef<T>],
    batch: Vec<T>,
) -> PipelineResult<()>
where
    T: Clone + Send + Sync + 'static,
{
    let mut result = Ok(());
    for successor in successors {
        trace!(from, to = successor.name(), items = batch.len(), "forwarding");
        if let Err(e) = successor.process(batch.clone()).await {
            warn!(from, to = successor.name(), error = %e, "successor failed");
            result = result.and(Err(e));
        }
    }
    result
}

/// Tear down every element; the first error is returned.
pub(crate) async fn tear_down_all<T>(successors: &[ElementRef<T>]) -> PipelineResult<()>
where
    T: Send + 'static,
{
    let mut result = Ok(());
    for successor in successors {
        if let Err(e) = successor.tear_down().await {
            warn!(stage = successor.name(), error = %e, "tear-down failed");
            result = result.and(Err(e));
        }
    }
    result
}

/// Entry point into an already built part of the graph.
///
/// Components inside the graph that need to feed items back in hold a
/// `Weak<Inlet<T>>`, so the graph keeps no reference cycle. The inlet does not
/// propagate `set_up`/`tear_down`; its target is managed by its owner.
pub struct Inlet<T: Send + 'static> {
    name: String,
    target: OnceLock<ElementRef<T>>,
}

impl<T: Send + 'static> Inlet<T> {
    /// Unconnected inlet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: OnceLock::new(),
        }
    }

    /// Bind the inlet to `target`. An inlet can be bound once.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StageFailed`] if the inlet is already bound.
    pub fn connect(&self, target: ElementRef<T>) -> PipelineResult<()> {
        self.target
            .set(target)
            .map_err(|_target| {
                PipelineError::stage_failed(self.name.clone(), "inlet is already connected")
            })
    }

    /// Whether [`connect`](Self::connect) has been called.
    pub fn is_connected(&self) -> bool {
        self.target.get().is_some()
    }
}

impl<T: Send + 'static> fmt::Debug for Inlet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inlet")
            .field("name", &self.name)
            .field("target", &self.target.get().map(|target| target.name()))
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> Element<T> for Inlet<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, batch: Vec<T>) -> PipelineResult<()> {
        let target = self.target.get().ok_or(PipelineError::InletUnavailable)?;
        target.process(batch).await
    }
}
