//! Routing of the processing stages.

use std::sync::Arc;

use crate::{
    params,
    stage::{fx::FxStage, mixer::MixingMatrix, pre::PreStage},
    utils::buffer::AudioBlock,
    Error, ParameterStore, ProcessorOptions, Stage,
};

// -------------------------------------------------------------------------------------------------

/// Processing order of the fx units and the mixing matrix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::VariantNames,
)]
pub enum Topology {
    /// Input -> Pre -> Fx -> Mixer -> Output ("pre")
    FxBeforeMixer,
    /// Input -> Pre -> Mixer -> Fx -> Output ("post")
    FxAfterMixer,
}

impl Topology {
    pub const ALL: [Topology; 2] = [Topology::FxBeforeMixer, Topology::FxAfterMixer];

    /// Topology selected by the given `fxPosition` parameter value.
    pub fn from_fx_position(value: f32) -> Self {
        if value > params::FX_POSITION_THRESHOLD {
            Topology::FxBeforeMixer
        } else {
            Topology::FxAfterMixer
        }
    }

    /// Stage processing order.
    pub const fn stage_order(self) -> [NodeId; 3] {
        match self {
            Topology::FxBeforeMixer => [NodeId::Pre, NodeId::Fx, NodeId::Mixer],
            Topology::FxAfterMixer => [NodeId::Pre, NodeId::Mixer, NodeId::Fx],
        }
    }

    const fn index(self) -> usize {
        match self {
            Topology::FxBeforeMixer => 0,
            Topology::FxAfterMixer => 1,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Nodes of the processing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum NodeId {
    Input,
    Pre,
    Fx,
    Mixer,
    Output,
}

// -------------------------------------------------------------------------------------------------

/// A single channel connection between two graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    pub channel: usize,
}

impl Connection {
    pub const fn new(from: NodeId, to: NodeId, channel: usize) -> Self {
        Self { from, to, channel }
    }
}

// -------------------------------------------------------------------------------------------------

/// A fully wired processing order for one [`Topology`].
///
/// Pipelines are built once, when the graph gets created. Switching topologies then only selects
/// another pipeline, so the real-time thread never rewires or allocates anything.
#[derive(Debug, Clone)]
pub struct Pipeline {
    topology: Topology,
    order: [NodeId; 3],
    connections: Vec<Connection>,
}

impl Pipeline {
    pub fn new(topology: Topology) -> Result<Self, Error> {
        let order = topology.stage_order();
        let mut chain = Vec::with_capacity(order.len() + 2);
        chain.push(NodeId::Input);
        chain.extend_from_slice(&order);
        chain.push(NodeId::Output);

        let connections = (0..AudioBlock::CHANNEL_COUNT)
            .flat_map(|channel| {
                chain
                    .windows(2)
                    .map(move |nodes| Connection::new(nodes[0], nodes[1], channel))
            })
            .collect();

        let pipeline = Self {
            topology,
            order,
            connections,
        };
        pipeline.validate()?;
        Ok(pipeline)
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Stages in processing order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// All connections, for all channels.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Ensures that all connections reference existing nodes and that every channel runs from
    /// the input through all stages to the output, in processing order.
    pub fn validate(&self) -> Result<(), Error> {
        let is_known = |node: NodeId| {
            matches!(node, NodeId::Input | NodeId::Output) || self.order.contains(&node)
        };
        if let Some(dangling) = self
            .connections
            .iter()
            .find(|c| !is_known(c.from) || !is_known(c.to))
        {
            return Err(Error::GraphError(format!(
                "{} connection {} -> {} references a node which is not part of the pipeline",
                self.topology, dangling.from, dangling.to
            )));
        }
        for channel in 0..AudioBlock::CHANNEL_COUNT {
            let mut node = NodeId::Input;
            for expected in self.order.iter().copied().chain([NodeId::Output]) {
                let next = self
                    .connections
                    .iter()
                    .find(|c| c.channel == channel && c.from == node)
                    .map(|c| c.to);
                if next != Some(expected) {
                    return Err(Error::GraphError(format!(
                        "{} channel {channel}: expected connection {node} -> {expected}",
                        self.topology
                    )));
                }
                node = expected;
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// Owns the processing stages and a prebuilt [`Pipeline`] for each [`Topology`].
///
/// Exactly one pipeline is active at a time. [`Graph::switch_topology`] swaps the active pipeline
/// at block boundaries; it does not crossfade, so switching while audio is playing may produce
/// an audible discontinuity.
pub struct Graph {
    pre: PreStage,
    fx: FxStage,
    mixer: MixingMatrix,
    pipelines: [Pipeline; 2],
    active: usize,
}

impl Graph {
    /// Create all stages and pipelines. The graph still needs to be prepared before processing.
    pub fn new(
        store: Arc<ParameterStore>,
        options: &ProcessorOptions,
        topology: Topology,
    ) -> Result<Self, Error> {
        let pre = PreStage::new(Arc::clone(&store), options.panner_law)?;
        let fx = FxStage::new(Arc::clone(&store), options.fx_smoothing_divisor)?;
        let mixer = MixingMatrix::new(store)?;
        let pipelines = [
            Pipeline::new(Topology::FxBeforeMixer)?,
            Pipeline::new(Topology::FxAfterMixer)?,
        ];
        debug_assert!(Topology::ALL
            .iter()
            .all(|t| pipelines[t.index()].topology() == *t));
        Ok(Self {
            pre,
            fx,
            mixer,
            pipelines,
            active: topology.index(),
        })
    }

    /// Prepare all stages.
    pub fn prepare(&mut self, sample_rate: f64, block_size: usize) -> Result<(), Error> {
        for node in [NodeId::Pre, NodeId::Fx, NodeId::Mixer] {
            if let Some(stage) = self.stage_mut(node) {
                stage.prepare(sample_rate, block_size)?;
            }
        }
        Ok(())
    }

    /// Currently active topology.
    pub fn topology(&self) -> Topology {
        self.pipeline().topology()
    }

    /// Currently active pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipelines[self.active]
    }

    /// Connections of the active pipeline.
    pub fn connections(&self) -> &[Connection] {
        self.pipeline().connections()
    }

    /// Activate the given topology's pipeline. Returns true when the topology changed.
    pub fn switch_topology(&mut self, topology: Topology) -> bool {
        let index = topology.index();
        if index == self.active {
            return false;
        }
        self.active = index;
        true
    }

    /// Access a stage by its node id. Returns None for the input and output nodes.
    pub fn stage(&self, node: NodeId) -> Option<&dyn Stage> {
        match node {
            NodeId::Pre => Some(&self.pre),
            NodeId::Fx => Some(&self.fx),
            NodeId::Mixer => Some(&self.mixer),
            NodeId::Input | NodeId::Output => None,
        }
    }

    /// Ids of all parameters the stages read. The graph's own `fxPosition` is not included.
    pub fn parameter_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        [NodeId::Pre, NodeId::Fx, NodeId::Mixer]
            .into_iter()
            .filter_map(|node| self.stage(node))
            .flat_map(|stage| stage.parameter_ids().iter().copied())
    }

    fn stage_mut(&mut self, node: NodeId) -> Option<&mut dyn Stage> {
        match node {
            NodeId::Pre => Some(&mut self.pre),
            NodeId::Fx => Some(&mut self.fx),
            NodeId::Mixer => Some(&mut self.mixer),
            NodeId::Input | NodeId::Output => None,
        }
    }

    /// Run the block through all stages of the active pipeline.
    pub fn process(&mut self, block: &mut AudioBlock) {
        let order = self.pipelines[self.active].order;
        for node in order {
            if let Some(stage) = self.stage_mut(node) {
                stage.process(block);
            }
        }
    }

    /// Reset all stages.
    pub fn reset(&mut self) {
        for node in [NodeId::Pre, NodeId::Fx, NodeId::Mixer] {
            if let Some(stage) = self.stage_mut(node) {
                stage.reset();
            }
        }
    }

    /// Summed tail of all stages in the active pipeline. `None` when a stage's tail is unknown.
    pub fn tail_frames(&self) -> Option<usize> {
        self.pipeline()
            .order()
            .iter()
            .filter_map(|node| self.stage(*node))
            .map(|stage| stage.tail_frames())
            .sum()
    }
}

// -------------------------------------------------------------------------------------------------
