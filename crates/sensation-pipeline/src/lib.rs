//! Async dataflow pipeline for the sensation driver.
//!
//! A graph is assembled once at startup from boxed [`Element`]s:
//!
//! ```text
//! Node<Parse> → Node<Sequence> → Parallelizer ─┬→ Node<TypeFilter> → Node<Handler>
//!                     ↑                         └→ Node<TypeFilter> → Node<Dispatcher>
//!                   Inlet  ←───── (weak) ──────────────────────────────────┘
//! ```
//!
//! Batches flow top to bottom. Each stage may drop individual items without
//! affecting the rest of the batch, and a [`Parallelizer`] detaches its
//! branches into tasks it cancels on tear-down.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sensation_pipeline::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), PipelineError> {
//! let sink = Node::new(Dispatcher::new("square", |n: u32| Ok(n * n)));
//! let pipeline = Pipeline::new(Arc::new(sink));
//!
//! pipeline.set_up().await?;
//! pipeline.process(vec![2, 3]).await?;
//! pipeline.tear_down().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod dispatcher;
pub mod element;
pub mod error;
pub mod filter;
pub mod inspect;
pub mod node;
pub mod parallelizer;
pub mod pipeline;
pub mod prelude;

pub use dispatcher::Dispatcher;
pub use element::{Element, ElementRef, Stage};
pub use error::{PipelineError, PipelineResult};
pub use filter::{Tagged, TypeFilter};
pub use inspect::Inspect;
pub use node::{Inlet, Node};
pub use parallelizer::{DEFAULT_TEARDOWN_GRACE, Parallelizer};
pub use pipeline::Pipeline;
