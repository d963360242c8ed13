use super::{Optimizer, optimizer::check_len};
use crate::Result;

/// Holds an aggregation of past gradients.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceState {
    pub trace: Box<[f32]>,
}

#[derive(Debug, Clone, Copy)]
pub struct GradientDescentWithMomentum {
    learning_rate: f32,
    momentum: f32,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `momentum` - The decay applied to the trace of past gradients.
    ///
    /// # Returns
    /// A new `GradientDescentWithMomentum` instance.
    pub fn new(learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    type State = TraceState;

    fn init(&self, params: &[f32]) -> Self::State {
        TraceState {
            trace: vec![0.; params.len()].into_boxed_slice(),
        }
    }

    fn update(&self, grad: &[f32], state: &mut TraceState, updates: &mut [f32]) -> Result<()> {
        check_len("momentum trace", state.trace.len(), grad.len())?;
        check_len("momentum updates", updates.len(), grad.len())?;

        let lr = self.learning_rate;
        let mu = self.momentum;

        updates
            .iter_mut()
            .zip(grad)
            .zip(state.trace.iter_mut())
            .for_each(|((u, g), v)| {
                *v = (mu * *v) + g;
                *u = -lr * *v;
            });

        Ok(())
    }
}
