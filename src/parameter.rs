//! Parameter descriptors, value curves and the shared, lock-free parameter store.

// -------------------------------------------------------------------------------------------------

mod float;
pub use float::FloatParameter;

mod scaling;
pub use scaling::ParameterScaling;

mod store;
pub use store::{ParameterHandle, ParameterStore};

mod smoothed;
pub use smoothed::SmoothedParameterValue;
