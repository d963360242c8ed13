use ndarray::{Array2, ArrayView2, Axis};

use crate::{MlErr, Result};

/// Row-wise log-softmax, turning logits into log-probabilities. It has no parameters.
#[derive(Debug, Clone)]
pub struct LogSoftmax {
    probs: Array2<f32>,
}

impl Default for LogSoftmax {
    fn default() -> Self {
        Self {
            probs: Array2::zeros((0, 0)),
        }
    }
}

impl LogSoftmax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, x: ArrayView2<f32>) -> Array2<f32> {
        let mut out = x.to_owned();

        for mut row in out.rows_mut() {
            let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            let lse = row.mapv(|v| (v - max).exp()).sum().ln();
            row.mapv_inplace(|v| (v - max) - lse);
        }

        self.probs = out.mapv(f32::exp);
        out
    }

    pub fn backward(&mut self, d: Array2<f32>) -> Result<Array2<f32>> {
        if d.dim() != self.probs.dim() {
            return Err(MlErr::SizeMismatch {
                what: "log softmax delta",
                got: d.len(),
                expected: self.probs.len(),
            });
        }

        let row_sums = d.sum_axis(Axis(1)).insert_axis(Axis(1));
        Ok(&d - &(&self.probs * &row_sums))
    }
}
