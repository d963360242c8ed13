use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// The knobs of an `SgdAgent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgdAgentConfig {
    pub classification: bool,
    /// Observation noise variance, used as the predictive variance.
    pub obs_noise: f32,
    /// Memory capacity, `None` keeps every observation.
    pub buffer_size: Option<NonZeroUsize>,
    /// Full-batch epochs run on every update.
    pub nepochs: usize,
    /// Minimum amount of buffered rows before an update is made.
    pub threshold: usize,
}

impl Default for SgdAgentConfig {
    fn default() -> Self {
        Self {
            classification: false,
            obs_noise: 0.01,
            buffer_size: None,
            nepochs: 20,
            threshold: 1,
        }
    }
}
