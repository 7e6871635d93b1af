#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod error;
mod graph;
mod parameter;
mod processor;
mod stage;

// public, flat re-exports
pub use error::Error;

pub use parameter::{
    FloatParameter, ParameterHandle, ParameterScaling, ParameterStore, SmoothedParameterValue,
};

pub use stage::Stage;

pub use graph::{Connection, Graph, NodeId, Pipeline, Topology};

pub use processor::{Processor, ProcessorOptions};

pub use utils::{buffer::AudioBlock, panning::PannerLaw};

// public mods
pub mod params;
pub mod utils;

pub mod stages {
    //! The processing stages of the graph.

    pub use super::stage::{
        fx::{ChannelRole, FxStage, FxUnit},
        mixer::{MixerCell, MixingMatrix},
        pre::PreStage,
    };
}
