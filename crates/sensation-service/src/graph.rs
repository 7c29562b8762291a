//! Wiring of the processing graph.
//!
//! ```text
//! frames ─▶ parser ─▶ sequencer ─▶ inspect ─▶ fan-out ─┬─▶ VIBRATION filter ─▶ vibration handler
//!                        ▲                             ├─▶ LOAD_PATTERN filter ─▶ pattern loader
//!                        │                             └─▶ PLAY_PATTERN filter ─▶ pattern player
//!                        └──────────── pattern inlet ◀──────────────────────────────────┘
//! ```

use std::sync::Arc;

use sensation_actors::Topology;
use sensation_pipeline::{
    Dispatcher, ElementRef, Inlet, Inspect, Node, Parallelizer, Pipeline, PipelineError,
    TypeFilter,
};
use sensation_protocol::{
    Frame, LoadPattern, Message, MessageCodec, MessageType, PlayPattern, Vibration,
};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::handlers::{PatternHandler, VibrationHandler};
use crate::parse::ParseStage;
use crate::sequencer::{Sequenced, Sequencer};

/// The assembled graph together with the handles the server needs.
#[derive(Debug)]
pub struct SensationGraph {
    pipeline: Arc<Pipeline<Frame>>,
    inlet: Arc<Inlet<Message>>,
    patterns: Arc<PatternHandler>,
    topology: Arc<Topology>,
}

impl SensationGraph {
    /// Build the graph driving the actors in `topology`.
    ///
    /// # Errors
    ///
    /// Fails if the sample rate gives no usable interval or the feedback
    /// inlet cannot be connected.
    pub fn build(topology: Arc<Topology>, config: &ServiceConfig) -> ServiceResult<Self> {
        let inlet = Arc::new(Inlet::new("pattern-inlet"));
        let patterns = Arc::new(PatternHandler::new(
            Arc::downgrade(&inlet),
            config.sample_interval()?,
        ));

        let vibration: ElementRef<Sequenced<Message>> = Arc::new(
            Node::new(TypeFilter::new(
                "vibration-filter",
                MessageType::Vibration,
                extract_vibration,
            ))
            .with_successor(Arc::new(Node::new(VibrationHandler::new(Arc::clone(
                &topology,
            ))))),
        );

        let loader = Arc::clone(&patterns);
        let load: ElementRef<Sequenced<Message>> = Arc::new(
            Node::new(TypeFilter::new(
                "load-pattern-filter",
                MessageType::LoadPattern,
                extract_load,
            ))
            .with_successor(Arc::new(Node::new(Dispatcher::new(
                "pattern-loader",
                move |request: LoadPattern| {
                    loader
                        .load(request)
                        .map_err(|e| PipelineError::stage_failed("pattern-loader", e))
                },
            )))),
        );

        let player = Arc::clone(&patterns);
        let play: ElementRef<Sequenced<Message>> = Arc::new(
            Node::new(TypeFilter::new(
                "play-pattern-filter",
                MessageType::PlayPattern,
                extract_play,
            ))
            .with_successor(Arc::new(Node::new(Dispatcher::new_async(
                "pattern-player",
                move |request: PlayPattern| {
                    let player = Arc::clone(&player);
                    async move {
                        player
                            .play(request)
                            .await
                            .map_err(|e| PipelineError::stage_failed("pattern-player", e))
                    }
                },
            )))),
        );

        let fan_out = Parallelizer::new("fan-out")
            .with_grace(config.teardown_grace())
            .with_successors([vibration, load, play]);
        let inspect = Node::new(Inspect::<Sequenced<Message>>::new("inspect"))
            .with_successor(Arc::new(fan_out));
        let sequencer: ElementRef<Message> =
            Arc::new(Node::new(Sequencer::new()).with_successor(Arc::new(inspect)));

        inlet.connect(Arc::clone(&sequencer))?;

        let parser = Node::new(ParseStage::new(MessageCodec::with_max_size(
            config.max_frame_size,
        )))
        .with_successor(sequencer);
        let pipeline = Arc::new(Pipeline::new(Arc::new(parser)));
        debug!(actors = topology.actor_count(), "processing graph built");

        Ok(Self {
            pipeline,
            inlet,
            patterns,
            topology,
        })
    }

    /// The pipeline fed with raw frames.
    pub fn pipeline(&self) -> &Arc<Pipeline<Frame>> {
        &self.pipeline
    }

    /// Entry point for synthesized messages.
    pub fn inlet(&self) -> &Arc<Inlet<Message>> {
        &self.inlet
    }

    /// Pattern registry and player.
    pub fn patterns(&self) -> &Arc<PatternHandler> {
        &self.patterns
    }

    /// Configured actors.
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }
}

fn extract_vibration(message: Sequenced<Message>) -> Option<Sequenced<Vibration>> {
    let Sequenced { sequence, item } = message;
    item.vibration.map(|vibration| Sequenced::new(sequence, vibration))
}

fn extract_load(message: Sequenced<Message>) -> Option<LoadPattern> {
    message.item.load_pattern
}

fn extract_play(message: Sequenced<Message>) -> Option<PlayPattern> {
    message.item.play_pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensation_actors::{Actor, DriverAddress, MotorParams, VibrationMotor};
    use sensation_pipeline::Element;
    use sensation_protocol::Region;
    use sensation_test_helpers::prelude::*;

    fn graph() -> (SensationGraph, Arc<MockPwmDriver>) {
        let driver = MockPwmDriver::at(DriverAddress::new(1, 0x40)).shared();
        let mut topology = Topology::new();
        must(topology.insert(Actor {
            region: Region::Back,
            index: 0,
            position: "spine".to_string(),
            motor: VibrationMotor::new(driver.clone(), 0, MotorParams::default()),
        }));
        let graph = must(SensationGraph::build(
            Arc::new(topology),
            &ServiceConfig::default(),
        ));
        (graph, driver)
    }

    #[tokio::test(start_paused = true)]
    async fn test_inlet_feeds_the_sequencer() {
        let (graph, driver) = graph();
        must(graph.pipeline().set_up().await);
        assert!(graph.inlet().is_connected());

        must(graph
            .inlet()
            .process(vec![Message::from(Vibration::new(Region::Back, 0, 1.0))])
            .await);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(driver.writes_to(0).len(), 1);
        must(graph.pipeline().tear_down().await);
        assert_eq!(must_some(driver.last_write(), "no write").off_tick, 0);
    }

    #[test]
    fn test_extractors_keep_sequence() {
        let message = Sequenced::new(12, Message::from(Vibration::new(Region::Head, 3, 0.5)));
        let extracted = must_some(extract_vibration(message.clone()), "payload missing");
        assert_eq!(extracted.sequence, 12);
        assert_eq!(extracted.item.actor_index, 3);
        assert!(extract_play(message).is_none());
    }
}
