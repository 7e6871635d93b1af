use std::{error, fmt};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by pantheon.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    InvalidSampleRate(f64),
    InvalidBlockSize(usize),
    NotPrepared,
    BlockSizeMismatch { left: usize, right: usize },
    ParameterNotFound(String),
    ParameterError(String),
    GraphError(String),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate(sample_rate) => {
                write!(f, "Invalid sample rate: {sample_rate} (must be > 0)")
            }
            Self::InvalidBlockSize(block_size) => {
                write!(f, "Invalid block size: {block_size} (must be > 0)")
            }
            Self::NotPrepared => write!(f, "Processor is not prepared"),
            Self::BlockSizeMismatch { left, right } => write!(
                f,
                "Channel buffers differ in length: left has {left}, right has {right} frames"
            ),
            Self::ParameterNotFound(id) => write!(f, "Parameter '{id}' not found"),
            Self::ParameterError(str) => write!(f, "Invalid parameter: {str}"),
            Self::GraphError(str) => write!(f, "Invalid graph: {str}"),
        }
    }
}
