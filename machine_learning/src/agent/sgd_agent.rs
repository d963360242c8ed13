use log::{debug, trace, warn};
use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Agent, BeliefState, Info, SgdAgentConfig};
use crate::{
    MlErr, Result,
    arch::{Model, loss::LossFn},
    memory::Memory,
    optimization::{Optimizer, apply_updates},
};

/// A point-estimate agent fitted by full-batch gradient descent over a bounded memory of the
/// observations seen so far.
#[derive(Debug)]
pub struct SgdAgent<M, L, O>
where
    M: Model,
    L: LossFn,
    O: Optimizer,
{
    model: M,
    loss_fn: L,
    optimizer: O,
    memory: Memory,
    config: SgdAgentConfig,

    // Gradient and update scratch buffers, reused across epochs.
    grad: Vec<f32>,
    updates: Vec<f32>,
}

impl<M, L, O> SgdAgent<M, L, O>
where
    M: Model,
    L: LossFn,
    O: Optimizer,
{
    /// Creates a new `SgdAgent`.
    ///
    /// # Arguments
    /// * `model` - The model whose parameters are fitted.
    /// * `loss_fn` - The loss minimized on every epoch.
    /// * `optimizer` - The optimizer dictating how the gradient updates the parameters.
    /// * `config` - The agent's configuration.
    ///
    /// # Returns
    /// A new `SgdAgent`, or an error if the threshold can never be met or there are no epochs.
    pub fn new(model: M, loss_fn: L, optimizer: O, config: SgdAgentConfig) -> Result<Self> {
        if config
            .buffer_size
            .is_some_and(|buffer_size| config.threshold > buffer_size.get())
        {
            return Err(MlErr::InvalidConfig(
                "the threshold must not exceed the buffer size",
            ));
        }

        if config.nepochs == 0 {
            return Err(MlErr::InvalidConfig("nepochs must be positive"));
        }

        let size = model.size();

        Ok(Self {
            memory: Memory::new(config.buffer_size),
            grad: vec![0.; size],
            updates: vec![0.; size],
            model,
            loss_fn,
            optimizer,
            config,
        })
    }

    pub fn config(&self) -> &SgdAgentConfig {
        &self.config
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Runs every epoch over the buffered rows.
    fn fit(&mut self, belief: BeliefState<O::State>) -> Result<(BeliefState<O::State>, Info)> {
        let BeliefState {
            mut params,
            mut opt_state,
        } = belief;
        let (x, y) = self.memory.view();
        let mut loss = f32::INFINITY;

        for epoch in 0..self.config.nepochs {
            loss = self
                .model
                .value_and_grad(&params, &mut self.grad, &self.loss_fn, x, y)?;
            self.optimizer
                .update(&self.grad, &mut opt_state, &mut self.updates)?;
            apply_updates(&mut params, &self.updates)?;

            trace!("epoch {epoch}: loss {loss}");
        }

        debug!(
            "fitted {} buffered rows for {} epochs, final loss {loss}",
            x.nrows(),
            self.config.nepochs
        );

        Ok((BeliefState { params, opt_state }, Info::Trained { loss }))
    }
}

impl<M, L, O> Agent for SgdAgent<M, L, O>
where
    M: Model,
    L: LossFn,
    O: Optimizer,
{
    type Belief = BeliefState<O::State>;

    fn classification(&self) -> bool {
        self.config.classification
    }

    fn init_state(&self, params: Vec<f32>) -> Self::Belief {
        let opt_state = self.optimizer.init(&params);
        BeliefState { params, opt_state }
    }

    fn update<R: Rng + ?Sized>(
        &mut self,
        _rng: &mut R,
        belief: Self::Belief,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<(Self::Belief, Info)> {
        if let Some(capacity) = self
            .config
            .buffer_size
            .filter(|capacity| x.nrows() > capacity.get())
        {
            return Err(MlErr::BatchExceedsBuffer {
                got: x.nrows(),
                capacity: capacity.get(),
            });
        }

        if let Some(expected) = self.model.input_dim().filter(|&dim| dim != x.ncols()) {
            return Err(MlErr::SizeMismatch {
                what: "batch input columns",
                got: x.ncols(),
                expected,
            });
        }

        // A batch the model can't be fitted on must not stay buffered.
        let previous = self.memory.clone();
        self.memory.push(x, y)?;

        if self.memory.len() < self.config.threshold {
            warn!(
                buffered = self.memory.len(), threshold = self.config.threshold;
                "There should be more data."
            );
            return Ok((belief, Info::NotEnoughData));
        }

        self.fit(belief).inspect_err(|_| self.memory = previous)
    }

    fn apply(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let n = x.nrows();
        let predictions = self.model.forward(params, x)?;

        if predictions.nrows() != n {
            return Err(MlErr::SizeMismatch {
                what: "prediction rows",
                got: predictions.nrows(),
                expected: n,
            });
        }

        Ok(predictions)
    }

    fn sample_params<R: Rng + ?Sized>(&self, _rng: &mut R, belief: &Self::Belief) -> Vec<f32> {
        belief.params.clone()
    }

    fn predict<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        belief: &Self::Belief,
        x: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>)> {
        let params = self.sample_params(rng, belief);
        let mu = self.apply(&params, x)?;
        let sigma = Array2::from_elem(mu.dim(), self.config.obs_noise.sqrt());

        Ok((mu, sigma))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use ndarray::{Array2, array};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        arch::{Sequential, layers::Layer, loss::Mse},
        optimization::{Adam, GradientDescent},
    };

    fn linear_agent(config: SgdAgentConfig) -> SgdAgent<Sequential, Mse, GradientDescent> {
        let model = Sequential::new([Layer::dense((1, 1), None)]);
        SgdAgent::new(model, Mse, GradientDescent::new(0.05), config).unwrap()
    }

    fn line(n: usize) -> (Array2<f32>, Array2<f32>) {
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f32 / n as f32);
        let y = x.mapv(|v| 3. * v - 1.);
        (x, y)
    }

    #[test]
    fn threshold_above_buffer_size_is_rejected() {
        let model = Sequential::new([Layer::dense((1, 1), None)]);
        let config = SgdAgentConfig {
            buffer_size: NonZeroUsize::new(2),
            threshold: 3,
            ..Default::default()
        };

        assert!(matches!(
            SgdAgent::new(model, Mse, Adam::new(1e-2), config),
            Err(MlErr::InvalidConfig(_))
        ));
    }

    #[test]
    fn update_is_a_noop_below_the_threshold() {
        let mut agent = linear_agent(SgdAgentConfig {
            threshold: 5,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(0);
        let belief = agent.init_state(vec![0.3, -0.2]);
        let (x, y) = line(3);

        let (new_belief, info) = agent
            .update(&mut rng, belief.clone(), x.view(), y.view())
            .unwrap();

        assert_eq!(new_belief, belief);
        assert_eq!(info, Info::NotEnoughData);
        assert_eq!(agent.memory().len(), 3);
    }

    #[test]
    fn batch_larger_than_the_buffer_fails() {
        let mut agent = linear_agent(SgdAgentConfig {
            buffer_size: NonZeroUsize::new(2),
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(0);
        let belief = agent.init_state(vec![0.; 2]);
        let (x, y) = line(3);

        assert_eq!(
            agent
                .update(&mut rng, belief, x.view(), y.view())
                .unwrap_err(),
            MlErr::BatchExceedsBuffer {
                got: 3,
                capacity: 2
            }
        );
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn loss_does_not_increase_on_fixed_data() {
        let mut agent = linear_agent(SgdAgentConfig {
            nepochs: 1,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(0);
        let mut belief = agent.init_state(vec![0.; 2]);
        let (x, y) = line(8);

        let (b, info) = agent
            .update(&mut rng, belief, x.view(), y.view())
            .unwrap();
        belief = b;
        let mut prev = info.loss();

        // Empty batches keep the buffered data fixed while still running an epoch.
        let empty_x = Array2::zeros((0, 1));
        let empty_y = Array2::zeros((0, 1));
        for _ in 0..50 {
            let (b, info) = agent
                .update(&mut rng, belief, empty_x.view(), empty_y.view())
                .unwrap();
            belief = b;

            assert!(info.loss() <= prev + 1e-6, "{} > {prev}", info.loss());
            prev = info.loss();
        }
    }

    #[test]
    fn fits_a_line() {
        let mut agent = linear_agent(SgdAgentConfig {
            nepochs: 2000,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(0);
        let belief = agent.init_state(vec![0.; 2]);
        let (x, y) = line(10);

        let (belief, info) = agent
            .update(&mut rng, belief, x.view(), y.view())
            .unwrap();

        assert!(info.loss() < 1e-2, "loss {}", info.loss());
        assert!((belief.params[0] - 3.).abs() < 0.3);
        assert!((belief.params[1] + 1.).abs() < 0.2);
    }

    #[test]
    fn apply_has_one_row_per_sample() {
        let model = Sequential::new([Layer::dense((3, 2), None), Layer::log_softmax()]);
        let mut agent = SgdAgent::new(
            model,
            crate::arch::loss::CrossEntropy,
            Adam::new(1e-2),
            SgdAgentConfig::default(),
        )
        .unwrap();
        let params = vec![0.1; 8];
        let x = Array2::ones((5, 3));

        let out = agent.apply(&params, x.view()).unwrap();

        assert_eq!(out.dim(), (5, 2));
    }

    #[test]
    fn sample_params_returns_the_point_estimate() {
        let agent = linear_agent(SgdAgentConfig::default());
        let belief = agent.init_state(vec![1.0, 2.0]);

        let params = agent.sample_params(&mut StdRng::seed_from_u64(1), &belief);

        assert_eq!(params, [1.0, 2.0]);
    }

    #[test]
    fn predict_uses_the_observation_noise_as_spread() {
        let mut agent = linear_agent(SgdAgentConfig {
            obs_noise: 0.04,
            ..Default::default()
        });
        let belief = agent.init_state(vec![2.0, 1.0]);
        let x = array![[0.0], [1.0]];

        let (mu, sigma) = agent
            .predict(&mut StdRng::seed_from_u64(0), &belief, x.view())
            .unwrap();

        assert_eq!(mu, array![[1.0], [3.0]]);
        assert!(sigma.iter().all(|s| (s - 0.2).abs() < 1e-6));
    }

    #[test]
    fn batch_of_the_wrong_width_is_not_buffered() {
        let mut agent = SgdAgent::new(
            Sequential::new([Layer::dense((2, 1), None)]),
            Mse,
            GradientDescent::new(0.05),
            SgdAgentConfig {
                threshold: 4,
                ..Default::default()
            },
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let belief = agent.init_state(vec![0.; 3]);

        let wide = Array2::ones((2, 3));
        let err = agent
            .update(&mut rng, belief.clone(), wide.view(), Array2::ones((2, 1)).view())
            .unwrap_err();

        assert!(matches!(
            err,
            MlErr::SizeMismatch {
                what: "batch input columns",
                got: 3,
                expected: 2
            }
        ));
        assert!(agent.memory().is_empty());

        let x = Array2::from_shape_fn((4, 2), |(i, j)| (i + j) as f32 / 4.);
        let y = Array2::from_shape_fn((4, 1), |(i, _)| i as f32);
        let (_, info) = agent.update(&mut rng, belief, x.view(), y.view()).unwrap();

        assert!(matches!(info, Info::Trained { .. }));
        assert_eq!(agent.memory().len(), 4);
    }

    #[test]
    fn failed_fit_leaves_the_buffer_as_it_was() {
        let model = Sequential::new([Layer::dense((1, 2), None), Layer::log_softmax()]);
        let mut agent = SgdAgent::new(
            model,
            crate::arch::loss::CrossEntropy,
            GradientDescent::new(0.1),
            SgdAgentConfig::default(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let belief = agent.init_state(vec![0.; 4]);

        let x = array![[0.0], [1.0]];
        let (belief, _) = agent
            .update(&mut rng, belief, x.view(), array![[0.0], [1.0]].view())
            .unwrap();
        assert_eq!(agent.memory().len(), 2);

        let err = agent
            .update(&mut rng, belief.clone(), x.view(), array![[1.0], [5.0]].view())
            .unwrap_err();

        assert_eq!(
            err,
            MlErr::InvalidLabel {
                label: 5.0,
                nclasses: 2
            }
        );
        assert_eq!(agent.memory().len(), 2);

        let (_, info) = agent
            .update(&mut rng, belief, x.view(), array![[1.0], [0.0]].view())
            .unwrap();

        assert!(matches!(info, Info::Trained { .. }));
        assert_eq!(agent.memory().len(), 4);
    }
}
