use std::sync::Arc;

use crate::{
    params, stage::fx::ChannelRole, utils::buffer::AudioBlock, Error, ParameterStore,
    SmoothedParameterValue, Stage,
};

// -------------------------------------------------------------------------------------------------

/// Gain parameter ids of the mixer cells, indexed by `(source << 1) | target`.
const DIRECTIONS: [&str; 4] = [
    params::LEFT_PRE_GAIN,      // L -> L
    params::LEFT_TO_RIGHT_GAIN, // L -> R
    params::RIGHT_TO_LEFT_GAIN, // R -> L
    params::RIGHT_PRE_GAIN,     // R -> R
];

// -------------------------------------------------------------------------------------------------

/// A single mono gain cell of the [`MixingMatrix`], routing its source channel with a smoothed
/// gain into its target channel.
#[derive(Debug)]
pub struct MixerCell {
    source: ChannelRole,
    target: ChannelRole,
    gain: SmoothedParameterValue,
}

impl MixerCell {
    /// Creates a new cell, bound to the gain parameter of the given direction.
    pub fn new(
        store: &ParameterStore,
        source: ChannelRole,
        target: ChannelRole,
    ) -> Result<Self, Error> {
        let gain = SmoothedParameterValue::new(store, Self::parameter_id(source, target))?;
        Ok(Self {
            source,
            target,
            gain,
        })
    }

    /// Gain parameter id of the given routing direction.
    pub fn parameter_id(source: ChannelRole, target: ChannelRole) -> &'static str {
        DIRECTIONS[Self::index(source, target)]
    }

    pub fn source(&self) -> ChannelRole {
        self.source
    }

    pub fn target(&self) -> ChannelRole {
        self.target
    }

    /// Currently applied gain.
    pub fn gain(&self) -> f32 {
        self.gain.current_value()
    }

    const fn index(source: ChannelRole, target: ChannelRole) -> usize {
        (source.index() << 1) | target.index()
    }
}

// -------------------------------------------------------------------------------------------------

/// Stereo cross-feed gain matrix, made of four [`MixerCell`]s:
///
/// `left = left * leftPreGain + right * rightToLeftGain`
/// `right = right * rightPreGain + left * leftToRightGain`
///
/// Gain changes are ramped over one block.
#[derive(Debug)]
pub struct MixingMatrix {
    store: Arc<ParameterStore>,
    cells: [MixerCell; 4],
}

impl MixingMatrix {
    pub const STAGE_NAME: &str = "Mixer";

    pub fn new(store: Arc<ParameterStore>) -> Result<Self, Error> {
        use ChannelRole::{Left, Right};
        let cells = [
            MixerCell::new(&store, Left, Left)?,
            MixerCell::new(&store, Left, Right)?,
            MixerCell::new(&store, Right, Left)?,
            MixerCell::new(&store, Right, Right)?,
        ];
        Ok(Self { store, cells })
    }

    /// Access to the cell of the given routing direction.
    pub fn cell(&self, source: ChannelRole, target: ChannelRole) -> &MixerCell {
        &self.cells[MixerCell::index(source, target)]
    }

    fn need_ramp(&self) -> bool {
        self.cells.iter().any(|cell| cell.gain.value_need_ramp())
    }
}

impl Stage for MixingMatrix {
    fn name(&self) -> &'static str {
        Self::STAGE_NAME
    }

    fn parameter_ids(&self) -> &'static [&'static str] {
        &DIRECTIONS
    }

    fn prepare(&mut self, _sample_rate: f64, block_size: usize) -> Result<(), Error> {
        // ramp over one block
        let ramp_length =
            u32::try_from(block_size).map_err(|_| Error::InvalidBlockSize(block_size))?;
        for cell in &mut self.cells {
            cell.gain.smoother_mut().set_ramp_length(ramp_length);
        }
        self.reset();
        Ok(())
    }

    fn process(&mut self, block: &mut AudioBlock) {
        for cell in &mut self.cells {
            cell.gain.update(&self.store);
        }

        if self.need_ramp() {
            let [cell_ll, cell_lr, cell_rl, cell_rr] = &mut self.cells;
            for (left, right) in block.frames_mut() {
                let (ll, lr) = (cell_ll.gain.next_value(), cell_lr.gain.next_value());
                let (rl, rr) = (cell_rl.gain.next_value(), cell_rr.gain.next_value());
                let (input_l, input_r) = (*left, *right);
                *left = input_l * ll + input_r * rl;
                *right = input_r * rr + input_l * lr;
            }
        } else {
            let [ll, lr, rl, rr] = self.cells.each_ref().map(|cell| cell.gain.target_value());
            if ll == 1.0 && rr == 1.0 && lr == 0.0 && rl == 0.0 {
                return;
            }
            for (left, right) in block.frames_mut() {
                let (input_l, input_r) = (*left, *right);
                *left = input_l * ll + input_r * rl;
                *right = input_r * rr + input_l * lr;
            }
        }
    }

    fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.gain.init(&self.store);
        }
    }

    fn tail_frames(&self) -> Option<usize> {
        Some(0)
    }
}

// -------------------------------------------------------------------------------------------------
