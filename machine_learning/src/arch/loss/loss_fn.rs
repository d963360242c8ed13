use ndarray::{Array2, ArrayView2};

use crate::Result;

/// A differentiable measure of how far a model's output is from the expected one.
pub trait LossFn {
    /// Returns the loss of the prediction `y_pred` given the expected values `y`.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32>;

    /// Returns the derivative of the loss with respect to every entry of `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<Array2<f32>>;
}
