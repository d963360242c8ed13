use ndarray::{Array2, ArrayView2};

use super::{Dense, LogSoftmax};
use crate::{Result, arch::activations::ActFn};

/// A building block of a `Sequential` model.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
    LogSoftmax(LogSoftmax),
}

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    pub fn log_softmax() -> Self {
        Self::LogSoftmax(LogSoftmax::new())
    }

    /// Returns the amount of parameters of this layer.
    pub fn size(&self) -> usize {
        match self {
            Layer::Dense(l) => l.size(),
            Layer::LogSoftmax(_) => 0,
        }
    }

    /// Returns the amount of input columns this layer expects, if it's fixed.
    pub fn input_dim(&self) -> Option<usize> {
        match self {
            Layer::Dense(l) => Some(l.dim().0),
            Layer::LogSoftmax(_) => None,
        }
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Layer::Dense(l) => l.forward(params, x),
            Layer::LogSoftmax(l) => Ok(l.forward(x)),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Layer::Dense(l) => l.backward(params, grad, d),
            Layer::LogSoftmax(l) => l.backward(d),
        }
    }
}
