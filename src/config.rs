use std::{fs, num::NonZeroUsize, path::Path, path::PathBuf};

use anyhow::Context;
use machine_learning::SgdAgentConfig;
use serde::{Deserialize, Serialize};

/// The specification of the optimizer every agent of an experiment is built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
    GradientDescentWithMomentum {
        learning_rate: f32,
        momentum: f32,
    },
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        Self::Adam {
            learning_rate: 1e-2,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// The knobs of both demo experiments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub seed: u64,
    /// Degree of the polynomial features.
    pub degree: usize,
    pub ntrain: usize,
    pub ntest: usize,
    /// Size of both the train and test batches.
    pub batch_size: usize,
    /// Raw input features of the classification problem.
    pub nfeatures: usize,
    pub nclasses: usize,
    /// Observation noise variance of the environments, also the agents' predictive variance.
    pub obs_noise: f32,
    pub agent: SgdAgentConfig,
    pub optimizer: OptimizerSpec,
    /// Steps at which the agents get plotted.
    pub timesteps: Vec<usize>,
    /// Side of the mesh the decision surfaces are evaluated on.
    pub grid_size: usize,
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let ntrain = 100;

        Self {
            seed: 0,
            degree: 3,
            ntrain,
            ntest: 100,
            batch_size: 10,
            nfeatures: 2,
            nclasses: 2,
            obs_noise: 1.,
            agent: SgdAgentConfig {
                buffer_size: NonZeroUsize::new(ntrain),
                ..Default::default()
            },
            optimizer: OptimizerSpec::default(),
            timesteps: vec![0, 4, 9],
            grid_size: 50,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExperimentConfig {
    /// Loads a configuration from a JSON file, missing fields taking their default.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read '{}'", path.display()))?;

        serde_json::from_str(&content).with_context(|| format!("invalid config '{}'", path.display()))
    }

    /// The amount of steps the train set is split into.
    pub fn nsteps(&self) -> usize {
        self.ntrain / self.batch_size.max(1)
    }
}
