use ndarray::{Array2, ArrayView2};

use crate::{Result, arch::loss::LossFn};

/// A parametric function whose parameters live outside of it, in a flat `f32` slice.
pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Returns the amount of input columns the model expects, `None` if any width is accepted.
    fn input_dim(&self) -> Option<usize>;

    /// Makes a forward pass through the model.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `x` - The input data, one sample per row.
    ///
    /// # Returns
    /// The prediction for every sample, one row each, or an error if occurred.
    fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Computes the loss of the model over a batch and its gradient with respect to the
    /// parameters, both in a single pass.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `grad` - A buffer the size of `params` where the gradient gets written.
    /// * `loss_fn` - The loss function.
    /// * `x` - The input data.
    /// * `y` - The expected output.
    ///
    /// # Returns
    /// The loss over the batch.
    fn value_and_grad<L: LossFn>(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        loss_fn: &L,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<f32>;
}
