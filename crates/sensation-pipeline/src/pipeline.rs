//! Graph root with lifecycle tracking.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::element::ElementRef;
use crate::error::PipelineResult;

/// Owns the root element of a graph and makes `set_up`/`tear_down`
/// idempotent.
pub struct Pipeline<T: Send + 'static> {
    root: ElementRef<T>,
    active: AtomicBool,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Wrap a graph whose entry is `root`.
    pub fn new(root: ElementRef<T>) -> Self {
        Self {
            root,
            active: AtomicBool::new(false),
        }
    }

    /// Root element.
    pub fn root(&self) -> &ElementRef<T> {
        &self.root
    }

    /// Whether the graph has been set up and not torn down since.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Set up every element, top to bottom. A no-op when already active.
    ///
    /// # Errors
    ///
    /// Returns the first set-up failure; the pipeline stays inactive.
    pub async fn set_up(&self) -> PipelineResult<()> {
        if self.active.swap(true, Ordering::AcqRel) {
            debug!(root = self.root.name(), "pipeline already set up");
            return Ok(());
        }
        if let Err(e) = self.root.set_up().await {
            self.active.store(false, Ordering::Release);
            return Err(e);
        }
        info!(root = self.root.name(), "pipeline set up");
        Ok(())
    }

    /// Tear down every element, bottom to top. A no-op when inactive.
    ///
    /// # Errors
    ///
    /// Returns the first tear-down failure after every element was attempted.
    pub async fn tear_down(&self) -> PipelineResult<()> {
        if !self.active.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        let result = self.root.tear_down().await;
        info!(root = self.root.name(), "pipeline torn down");
        result
    }

    /// Feed a batch into the root.
    ///
    /// # Errors
    ///
    /// Returns an error if an element on the synchronous path fails.
    pub async fn process(&self, batch: Vec<T>) -> PipelineResult<()> {
        self.root.process(batch).await
    }
}

impl<T: Send + 'static> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.root.name())
            .field("active", &self.is_active())
            .finish()
    }
}
