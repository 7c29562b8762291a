//! Callback stage.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::element::Stage;
use crate::error::PipelineResult;

type SyncTarget<I, O> = Box<dyn Fn(I) -> PipelineResult<O> + Send + Sync>;
type AsyncTarget<I, O> = Box<dyn Fn(I) -> BoxFuture<'static, PipelineResult<O>> + Send + Sync>;

enum Target<I, O> {
    Sync(SyncTarget<I, O>),
    Async(AsyncTarget<I, O>),
}

/// Calls an external function for every item and forwards its result.
pub struct Dispatcher<I, O> {
    name: String,
    target: Target<I, O>,
}

impl<I, O> Dispatcher<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Dispatch to a synchronous function.
    pub fn new<F>(name: impl Into<String>, target: F) -> Self
    where
        F: Fn(I) -> PipelineResult<O> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            target: Target::Sync(Box::new(target)),
        }
    }

    /// Dispatch to an async function; the stage awaits it per item.
    pub fn new_async<F, Fut>(name: impl Into<String>, target: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PipelineResult<O>> + Send + 'static,
    {
        Self {
            name: name.into(),
            target: Target::Async(Box::new(move |item| target(item).boxed())),
        }
    }

    /// Whether the target is awaited.
    pub fn is_async(&self) -> bool {
        matches!(self.target, Target::Async(_))
    }
}

impl<I, O> fmt::Debug for Dispatcher<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.target {
            Target::Sync(_) => "sync",
            Target::Async(_) => "async",
        };
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("target", &kind)
            .finish()
    }
}

#[async_trait]
impl<I, O> Stage for Dispatcher<I, O>
where
    I: Send + 'static,
    O: Clone + Send + Sync + 'static,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    async fn process_item(&self, item: I) -> PipelineResult<Option<O>> {
        let output = match &self.target {
            Target::Sync(target) => target(item)?,
            Target::Async(target) => target(item).await?,
        };
        Ok(Some(output))
    }
}
