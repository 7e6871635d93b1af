pub mod delay;
pub mod filters;
