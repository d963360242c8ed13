use ndarray::{Array2, ArrayView2};

use super::LossFn;
use crate::{MlErr, Result};

/// Negative mean log-likelihood of class labels.
///
/// `y_pred` holds one row of log-probabilities per sample (the output of a `LogSoftmax`
/// layer) and `y` is a single column with the class index of each sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }

    fn labels(y_pred: &ArrayView2<f32>, y: &ArrayView2<f32>) -> Result<Vec<usize>> {
        if y.ncols() != 1 {
            return Err(MlErr::SizeMismatch {
                what: "cross entropy label columns",
                got: y.ncols(),
                expected: 1,
            });
        }

        if y.nrows() != y_pred.nrows() {
            return Err(MlErr::SizeMismatch {
                what: "cross entropy labels",
                got: y.nrows(),
                expected: y_pred.nrows(),
            });
        }

        let nclasses = y_pred.ncols();

        y.iter()
            .map(|&label| {
                let idx = label as usize;
                if label < 0. || label.fract() != 0. || idx >= nclasses {
                    return Err(MlErr::InvalidLabel { label, nclasses });
                }

                Ok(idx)
            })
            .collect()
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32> {
        let labels = Self::labels(&y_pred, &y)?;
        if labels.is_empty() {
            return Ok(0.);
        }

        let total: f32 = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| y_pred[[i, label]])
            .sum();

        Ok(-total / labels.len() as f32)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<Array2<f32>> {
        let labels = Self::labels(&y_pred, &y)?;
        let mut d = Array2::zeros(y_pred.dim());
        let scale = -1. / labels.len().max(1) as f32;

        for (i, label) in labels.into_iter().enumerate() {
            d[[i, label]] = scale;
        }

        Ok(d)
    }
}
