use crate::{MlErr, Result};

/// Defines the strategy for turning gradients into parameter updates.
///
/// The optimizer itself only holds hyperparameters, whatever it accumulates between steps lives
/// in its `State`, which the caller threads through every call.
pub trait Optimizer {
    /// The bookkeeping carried from one step to the next.
    type State: Clone + std::fmt::Debug;

    /// Creates the initial state for the given parameters.
    fn init(&self, params: &[f32]) -> Self::State;

    /// Computes the updates for a gradient, advancing the state.
    ///
    /// # Arguments
    /// * `grad` - The gradient of the loss with respect to the parameters.
    /// * `state` - The optimizer's state.
    /// * `updates` - A buffer the size of `grad` where the updates get written.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `grad`, `state` and `updates`.
    fn update(&self, grad: &[f32], state: &mut Self::State, updates: &mut [f32]) -> Result<()>;
}

/// Adds the updates computed by an `Optimizer` to the parameters.
///
/// # Arguments
/// * `params` - The parameters to modify.
/// * `updates` - The updates to add.
///
/// # Returns
/// An error if the sizes of `params` and `updates` differ.
pub fn apply_updates(params: &mut [f32], updates: &[f32]) -> Result<()> {
    check_len("updates", updates.len(), params.len())?;

    for (p, u) in params.iter_mut().zip(updates) {
        *p += u;
    }

    Ok(())
}

pub(super) fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
