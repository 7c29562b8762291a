//! Prelude for pipeline builders.

pub use crate::dispatcher::Dispatcher;
pub use crate::element::{Element, ElementRef, Stage};
pub use crate::error::{PipelineError, PipelineResult};
pub use crate::filter::{Tagged, TypeFilter};
pub use crate::inspect::Inspect;
pub use crate::node::{Inlet, Node};
pub use crate::parallelizer::Parallelizer;
pub use crate::pipeline::Pipeline;
