use super::{Optimizer, optimizer::check_len};
use crate::Result;

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    type State = ();

    fn init(&self, _params: &[f32]) -> Self::State {}

    /// Makes a step in the opposite direction of the gradient, with a length of `learning_rate`.
    fn update(&self, grad: &[f32], _state: &mut (), updates: &mut [f32]) -> Result<()> {
        check_len("gradient descent updates", updates.len(), grad.len())?;

        let lr = self.learning_rate;

        for (u, g) in updates.iter_mut().zip(grad) {
            *u = -lr * g;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let gd = GradientDescent::new(0.1);
        let mut state = gd.init(&[0.0; 2]);
        let mut updates = [0.0; 2];

        gd.update(&[1.0, -2.0], &mut state, &mut updates).unwrap();

        assert_eq!(updates, [-0.1, 0.2]);
    }
}
