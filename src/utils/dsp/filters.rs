//! Filters used by the processing stages.

pub mod allpass;
