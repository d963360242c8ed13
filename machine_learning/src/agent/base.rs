use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::Result;

/// An agent's current parameter estimate plus its optimizer's bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefState<S> {
    pub params: Vec<f32>,
    pub opt_state: S,
}

/// Diagnostics of an `Agent::update` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Info {
    /// The belief was fitted, `loss` being the one of the last epoch.
    Trained { loss: f32 },
    /// Too little data was buffered, the belief was returned untouched.
    NotEnoughData,
}

impl Info {
    /// Returns the loss reported by the update, infinite when it was skipped.
    pub fn loss(&self) -> f32 {
        match self {
            Info::Trained { loss } => *loss,
            Info::NotEnoughData => f32::INFINITY,
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, Info::Trained { .. })
    }
}

/// A sequential learner fed with batches of `(x, y)` one step at a time.
///
/// The belief is threaded explicitly through every call: `update` takes it by value and hands
/// back its replacement.
pub trait Agent {
    type Belief;

    /// Whether the agent solves a classification problem.
    fn classification(&self) -> bool;

    /// Creates the initial belief from a set of parameters.
    fn init_state(&self, params: Vec<f32>) -> Self::Belief;

    /// Incorporates a new batch of observations.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `belief` - The current belief.
    /// * `x` - The inputs, one sample per row.
    /// * `y` - The targets, one sample per row.
    ///
    /// # Returns
    /// The new belief and the diagnostics of the update.
    fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        belief: Self::Belief,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<(Self::Belief, Info)>;

    /// Makes a forward pass with the given parameters.
    ///
    /// # Returns
    /// An array of shape `(x.nrows(), output_dim)`.
    fn apply(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Draws a set of parameters from the belief.
    fn sample_params<R: Rng + ?Sized>(&self, rng: &mut R, belief: &Self::Belief) -> Vec<f32>;

    /// Returns the predictive mean and standard deviation for every entry of `apply`.
    fn predict<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        belief: &Self::Belief,
        x: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>)>;
}
