pub mod config;
pub mod demos;
pub mod experiment;

pub use config::{ExperimentConfig, OptimizerSpec};
