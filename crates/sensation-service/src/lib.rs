//! Network daemon driving haptic vibration actuators.
//!
//! Clients connect over TCP and send length-prefixed protobuf messages:
//! direct vibration commands, pattern definitions and play requests. Frames
//! run through a processing graph (see [`graph`]) that decodes them, stamps
//! them with an arrival sequence number and fans them out to the handlers:
//!
//! - [`VibrationHandler`] arbitrates commands per actor and priority and
//!   drives the motors, dropping commands that arrive out of order.
//! - [`PatternHandler`] stores keyframed patterns and plays them back by
//!   sampling every track at a fixed rate and feeding the resulting vibration
//!   commands back into the graph.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sensation_actors::{ActorConfig, DummyBus, Topology};
//! use sensation_service::{SensationGraph, SensationServer, ServiceConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let actors = ActorConfig::from_yaml_str("vibration:\n  regions: []\n")?;
//! let topology = Topology::build(&actors, &DummyBus, config.pwm_frequency_hz);
//!
//! let graph = SensationGraph::build(Arc::new(topology), &config)?;
//! let server = SensationServer::new(config, graph);
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod parse;
pub mod prelude;
pub mod sequencer;
pub mod server;
pub mod track;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use graph::SensationGraph;
pub use handlers::{PatternHandler, VibrationHandler};
pub use parse::ParseStage;
pub use sequencer::{Sequenced, Sequencer};
pub use server::{ClientInfo, SensationServer, ServerState};
pub use track::{PatternTemplate, PatternTrack, TrackTemplate};
