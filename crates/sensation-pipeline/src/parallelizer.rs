//! Concurrent fan-out.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error};

use crate::element::{Element, ElementRef};
use crate::error::{PipelineError, PipelineResult};
use crate::node::tear_down_all;

/// Grace period for in-flight units on tear-down.
pub const DEFAULT_TEARDOWN_GRACE: Duration = Duration::from_secs(2);

/// Forwards every batch to each branch as an independent task and returns
/// without waiting for them.
///
/// Ordering across branches and across batches is not preserved. A failing or
/// panicking unit is logged when it is reaped and never affects its siblings.
/// On tear-down every unit is aborted and awaited for at most the grace
/// period before the branches themselves are torn down.
pub struct Parallelizer<T: Send + 'static> {
    name: String,
    successors: Vec<ElementRef<T>>,
    units: Mutex<JoinSet<PipelineResult<()>>>,
    grace: Duration,
}

impl<T> Parallelizer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Parallelizer without branches.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            successors: Vec::new(),
            units: Mutex::new(JoinSet::new()),
            grace: DEFAULT_TEARDOWN_GRACE,
        }
    }

    /// Append a branch.
    #[must_use]
    pub fn with_successor(mut self, successor: ElementRef<T>) -> Self {
        self.successors.push(successor);
        self
    }

    /// Append several branches.
    #[must_use]
    pub fn with_successors(mut self, successors: impl IntoIterator<Item = ElementRef<T>>) -> Self {
        self.successors.extend(successors);
        self
    }

    /// Use `grace` as the tear-down grace period.
    #[must_use]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Tear-down grace period.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Units spawned and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.units.lock().len()
    }

    fn reap(&self) {
        let mut units = self.units.lock();
        while let Some(outcome) = units.try_join_next() {
            report(&self.name, outcome);
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Parallelizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parallelizer")
            .field("name", &self.name)
            .field("successors", &self.successors)
            .field("in_flight", &self.units.lock().len())
            .field("grace", &self.grace)
            .finish()
    }
}

fn report(stage: &str, outcome: Result<PipelineResult<()>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(stage, error = %e, "parallel unit failed"),
        Err(e) if e.is_panic() => error!(stage, error = %e, "parallel unit panicked"),
        Err(_) => debug!(stage, "parallel unit cancelled"),
    }
}

#[async_trait]
impl<T> Element<T> for Parallelizer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, batch: Vec<T>) -> PipelineResult<()> {
        self.reap();
        if batch.is_empty() {
            return Ok(());
        }

        let mut units = self.units.lock();
        for successor in &self.successors {
            let successor = Arc::clone(successor);
            let batch = batch.clone();
            units.spawn(async move { successor.process(batch).await });
        }
        Ok(())
    }

    async fn set_up(&self) -> PipelineResult<()> {
        for successor in &self.successors {
            successor.set_up().await?;
        }
        Ok(())
    }

    async fn tear_down(&self) -> PipelineResult<()> {
        let mut units = std::mem::replace(&mut *self.units.lock(), JoinSet::new());
        units.abort_all();

        let drained = timeout(self.grace, async {
            while let Some(outcome) = units.join_next().await {
                report(&self.name, outcome);
            }
        })
        .await;

        if drained.is_err() {
            let e = PipelineError::TearDownTimeout {
                stage: self.name.clone(),
                pending: units.len(),
            };
            error!(stage = %self.name, error = %e, "giving up on in-flight units");
        }

        tear_down_all(&self.successors).await
    }
}
