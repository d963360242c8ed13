use super::{Optimizer, optimizer::check_len};
use crate::Result;

/// The moment estimates of `Adam`.
#[derive(Debug, Clone, PartialEq)]
pub struct AdamState {
    pub count: u32,
    pub mu: Box<[f32]>,
    pub nu: Box<[f32]>,
}

#[derive(Debug, Clone, Copy)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
}

impl Adam {
    /// Creates a new `Adam` optimizer with the usual hyperparameters
    /// (`beta1 = 0.9`, `beta2 = 0.999`, `epsilon = 1e-8`).
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    pub fn new(learning_rate: f32) -> Self {
        Self::with_hyperparams(learning_rate, 0.9, 0.999, 1e-8)
    }

    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn with_hyperparams(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        }
    }
}

impl Optimizer for Adam {
    type State = AdamState;

    fn init(&self, params: &[f32]) -> Self::State {
        AdamState {
            count: 0,
            mu: vec![0.; params.len()].into_boxed_slice(),
            nu: vec![0.; params.len()].into_boxed_slice(),
        }
    }

    fn update(&self, grad: &[f32], state: &mut AdamState, updates: &mut [f32]) -> Result<()> {
        check_len("adam first moment", state.mu.len(), grad.len())?;
        check_len("adam second moment", state.nu.len(), grad.len())?;
        check_len("adam updates", updates.len(), grad.len())?;

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
        } = *self;

        state.count += 1;
        let t = state.count as i32;

        let bc1 = 1. - b1.powi(t);
        let bc2 = 1. - b2.powi(t);

        updates
            .iter_mut()
            .zip(grad)
            .zip(state.mu.iter_mut())
            .zip(state.nu.iter_mut())
            .for_each(|(((u, g), m), v)| {
                *m = b1 * *m + (1. - b1) * g;
                *v = b2 * *v + (1. - b2) * g.powi(2);
                *u = -lr * (*m / bc1) / ((*v / bc2).sqrt() + eps);
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_has_the_length_of_the_learning_rate() {
        let adam = Adam::new(0.01);
        let mut state = adam.init(&[0.0; 3]);
        let mut updates = [0.0; 3];

        adam.update(&[4.0, -0.5, 100.0], &mut state, &mut updates)
            .unwrap();

        assert_eq!(state.count, 1);
        assert!((updates[0] + 0.01).abs() < 1e-5);
        assert!((updates[1] - 0.01).abs() < 1e-5);
        assert!((updates[2] + 0.01).abs() < 1e-5);
    }

    #[test]
    fn epsilon_is_added_after_bias_correction() {
        let adam = Adam::with_hyperparams(1.0, 0.9, 0.999, 1e-3);
        let mut state = adam.init(&[0.0]);
        let mut updates = [0.0];

        adam.update(&[1e-3], &mut state, &mut updates).unwrap();

        // m_hat = v_hat.sqrt() = 1e-3, so the step is 1e-3 / (1e-3 + 1e-3).
        assert!((updates[0] + 0.5).abs() < 1e-4, "got {}", updates[0]);
    }

    #[test]
    fn state_keeps_counting_across_updates() {
        let adam = Adam::new(0.1);
        let mut state = adam.init(&[0.0]);
        let mut updates = [0.0];

        for _ in 0..5 {
            adam.update(&[1.0], &mut state, &mut updates).unwrap();
        }

        assert_eq!(state.count, 5);
        assert!(updates[0] < 0.);
    }
}
