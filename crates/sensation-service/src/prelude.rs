//! Prelude for embedding the daemon.

pub use crate::config::ServiceConfig;
pub use crate::error::{ServiceError, ServiceResult};
pub use crate::graph::SensationGraph;
pub use crate::handlers::{PatternHandler, VibrationHandler};
pub use crate::sequencer::Sequenced;
pub use crate::server::{ClientInfo, SensationServer, ServerState};
