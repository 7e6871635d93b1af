//! Renders a sine sweep through the processor into a stereo wav file.
//!
//! Halfway through the sweep the fx position flips, so the rendered file also contains a
//! topology switch.

use std::{f64::consts::TAU, path::PathBuf};

use arg::{parse_args, Args};
use hound::{SampleFormat, WavSpec, WavWriter};

use pantheon::{params, Processor};

// -------------------------------------------------------------------------------------------------

#[cfg(all(debug_assertions, feature = "assert-allocs"))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

// -------------------------------------------------------------------------------------------------

const SAMPLE_RATE: u32 = 44100;
const BLOCK_SIZE: usize = 512;
const DURATION_SECONDS: f64 = 4.0;
const SWEEP_RANGE: (f64, f64) = (40.0, 8000.0);

const DEFAULT_LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Warn
};

// -------------------------------------------------------------------------------------------------

#[derive(Args, Debug, Default)]
struct Arguments {
    #[arg(short = "o", long = "output")]
    /// Target wav file. By default \"render.wav\".
    output_path: Option<PathBuf>,
    #[arg(short = "d", long = "delay")]
    /// Delay amount: negative values delay the left, positive values the right channel.
    delay: Option<f32>,
    #[arg(short = "a", long = "allpass")]
    /// All-pass amount: negative values shift the left, positive values the right channel.
    all_pass: Option<f32>,
    #[arg(short = "x", long = "cross-feed")]
    /// Left-to-right and right-to-left gain of the mixing matrix.
    cross_feed: Option<f32>,
    #[arg(short = "p", long = "pan")]
    /// Input pan position.
    pan: Option<f32>,
    #[arg(short = "l", long = "log-level")]
    /// Set logging level to \"debug\", \"info\", \"warn\" or \"error\".
    log_level: Option<log::Level>,
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args::<Arguments>();

    simple_logger::SimpleLogger::new()
        .with_level(args.log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_level_filter())
        .init()?;

    let mut processor = Processor::new()?;
    let parameters = processor.parameters().clone();
    parameters.set_value(params::DELAY_LINE, args.delay.unwrap_or(0.5))?;
    parameters.set_value(params::ALL_PASS_FREQ, args.all_pass.unwrap_or(-0.3))?;
    parameters.set_value(params::INPUT_PAN, args.pan.unwrap_or(0.0))?;
    let cross_feed = args.cross_feed.unwrap_or(0.3);
    parameters.set_value(params::LEFT_TO_RIGHT_GAIN, cross_feed)?;
    parameters.set_value(params::RIGHT_TO_LEFT_GAIN, cross_feed)?;

    processor.prepare(SAMPLE_RATE as f64, BLOCK_SIZE)?;

    let output_path = args
        .output_path
        .unwrap_or_else(|| PathBuf::from("render.wav"));
    let spec = WavSpec {
        channels: Processor::CHANNEL_COUNT as u16,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&output_path, spec)?;

    let total_frames = (DURATION_SECONDS * SAMPLE_RATE as f64) as usize;
    let (start_freq, end_freq) = SWEEP_RANGE;
    let sweep_rate = (end_freq / start_freq).ln() / DURATION_SECONDS;
    let mut phase = 0.0_f64;
    let mut buffer = vec![0.0_f32; BLOCK_SIZE * Processor::CHANNEL_COUNT];

    let mut frame = 0;
    while frame < total_frames {
        if frame >= total_frames / 2 {
            // fx after mixer for the second half
            parameters.set_value(params::FX_POSITION, 0.0)?;
        }
        let block_frames = BLOCK_SIZE.min(total_frames - frame);
        let block = &mut buffer[..block_frames * Processor::CHANNEL_COUNT];
        for (index, samples) in block.chunks_exact_mut(Processor::CHANNEL_COUNT).enumerate() {
            let time = (frame + index) as f64 / SAMPLE_RATE as f64;
            let freq = start_freq * (sweep_rate * time).exp();
            phase = (phase + TAU * freq / SAMPLE_RATE as f64) % TAU;
            let value = (phase.sin() * 0.5) as f32;
            samples.fill(value);
        }
        processor.process_interleaved(block);
        for sample in block.iter() {
            writer.write_sample(*sample)?;
        }
        frame += block_frames;
    }
    writer.finalize()?;

    processor.release();
    println!(
        "Rendered {:.1}s sweep to '{}'",
        DURATION_SECONDS,
        output_path.display()
    );
    Ok(())
}
