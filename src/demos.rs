//! The regression and classification demos, each rendering its charts into an SVG file.

use std::path::{Path, PathBuf};

use anyhow::bail;
use log::{info, warn};
use machine_learning::{
    Agent, SgdAgent, SgdAgentConfig,
    arch::{
        Model, Sequential,
        layers::Layer,
        loss::{CrossEntropy, LossFn, Mse},
    },
    environment::{
        SequentialDataEnvironment, make_random_poly_classification_environment,
        make_random_poly_regression_environment, polynomial_features,
    },
    initialization::ParamInit,
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, Optimizer},
};
use ndarray::{Array2, ArrayView1};
use plotters::{coord::Shift, prelude::*};
use plotting::{grid_2d, plot_classification_2d, plot_regression_posterior_predictive};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    ExperimentConfig, OptimizerSpec,
    experiment::{run_experiment, run_offline},
};

const AGENT_NAME: &str = "sgd";
const CELL_SIZE: u32 = 400;

/// A demo that runs with whichever optimizer its config specifies.
trait Demo {
    fn run<O: Optimizer + Copy>(&self, optimizer: O) -> anyhow::Result<PathBuf>;
}

/// Fits a polynomial regression with an online and an offline agent, plotting the online one at
/// every configured timestep and the offline one once fitted.
///
/// # Returns
/// The path of the written chart.
pub fn regression(config: &ExperimentConfig) -> anyhow::Result<PathBuf> {
    resolve_optimizer(config.optimizer, &RegressionDemo { config })
}

/// Fits a polynomial logistic regression with an online and an offline agent, plotting their
/// decision surfaces.
///
/// # Returns
/// The path of the written chart.
pub fn classification(config: &ExperimentConfig) -> anyhow::Result<PathBuf> {
    resolve_optimizer(config.optimizer, &ClassificationDemo { config })
}

fn resolve_optimizer<D: Demo>(spec: OptimizerSpec, demo: &D) -> anyhow::Result<PathBuf> {
    match spec {
        OptimizerSpec::Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } => demo.run(Adam::with_hyperparams(learning_rate, beta1, beta2, epsilon)),
        OptimizerSpec::GradientDescent { learning_rate } => {
            demo.run(GradientDescent::new(learning_rate))
        }
        OptimizerSpec::GradientDescentWithMomentum {
            learning_rate,
            momentum,
        } => demo.run(GradientDescentWithMomentum::new(learning_rate, momentum)),
    }
}

struct RegressionDemo<'a> {
    config: &'a ExperimentConfig,
}

impl Demo for RegressionDemo<'_> {
    fn run<O: Optimizer + Copy>(&self, optimizer: O) -> anyhow::Result<PathBuf> {
        let config = self.config;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let env = make_random_poly_regression_environment(
            &mut rng,
            config.degree,
            config.ntrain,
            config.ntest,
            config.obs_noise,
            config.batch_size,
            config.batch_size,
        )?;

        let model = Sequential::new([Layer::dense((env.nfeatures(), 1), None)]);
        let (mut agent, mut offline_agent, init) =
            build_agents(config, &env, &mut rng, model, Mse, optimizer, false)?;

        let path = config.output_dir.join("regression.svg");
        render(&path, config.timesteps.len() + 1, |areas| {
            let belief = agent.init_state(init.clone());
            run_experiment(&mut rng, &mut agent, belief, &env, |rng, agent, belief, report| {
                if let Some(col) = plotted_column(config, report.t) {
                    plot_regression_posterior_predictive(
                        &areas[col], rng, agent, &env, belief, AGENT_NAME, report.t,
                    )?;
                }

                Ok(())
            })?;

            let belief = offline_agent.init_state(init);
            let (belief, _) = run_offline(&mut rng, &mut offline_agent, belief, &env)?;
            plot_regression_posterior_predictive(
                &areas[areas.len() - 1],
                &mut rng,
                &mut offline_agent,
                &env,
                &belief,
                AGENT_NAME,
                env.nsteps().saturating_sub(1),
            )?;

            Ok(())
        })?;

        Ok(path)
    }
}

struct ClassificationDemo<'a> {
    config: &'a ExperimentConfig,
}

impl Demo for ClassificationDemo<'_> {
    fn run<O: Optimizer + Copy>(&self, optimizer: O) -> anyhow::Result<PathBuf> {
        let config = self.config;
        if config.nfeatures != 2 {
            bail!(
                "decision surfaces need 2 input features, got {}",
                config.nfeatures
            );
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let env = make_random_poly_classification_environment(
            &mut rng,
            config.degree,
            config.ntrain,
            config.ntest,
            config.nfeatures,
            config.nclasses,
            config.obs_noise,
            config.batch_size,
            config.batch_size,
            false,
        )?;

        let model = Sequential::new([
            Layer::dense((env.nfeatures(), config.nclasses), None),
            Layer::log_softmax(),
        ]);
        let (mut agent, mut offline_agent, init) =
            build_agents(config, &env, &mut rng, model, CrossEntropy, optimizer, true)?;

        let grid = decision_grid(&env, config.degree, config.grid_size)?;

        let path = config.output_dir.join("classification.svg");
        render(&path, config.timesteps.len() + 1, |areas| {
            let belief = agent.init_state(init.clone());
            let (_, reports) =
                run_experiment(&mut rng, &mut agent, belief, &env, |rng, agent, belief, report| {
                    if let Some(col) = plotted_column(config, report.t) {
                        let (logprobs, _) = agent.predict(rng, belief, grid.view())?;
                        let probs = logprobs.mapv(f32::exp);
                        plot_classification_2d(
                            &areas[col],
                            &env,
                            grid.view(),
                            probs.view(),
                            report.t,
                        )?;
                    }

                    Ok(())
                })?;

            let accuracies: Vec<f32> = reports.iter().filter_map(|r| r.accuracy).collect();
            if !accuracies.is_empty() {
                let mean = accuracies.iter().sum::<f32>() / accuracies.len() as f32;
                info!(mean_accuracy = mean; "online classification done");
            }

            let belief = offline_agent.init_state(init);
            let (belief, _) = run_offline(&mut rng, &mut offline_agent, belief, &env)?;
            let (logprobs, _) = offline_agent.predict(&mut rng, &belief, grid.view())?;
            let probs = logprobs.mapv(f32::exp);
            plot_classification_2d(
                &areas[areas.len() - 1],
                &env,
                grid.view(),
                probs.view(),
                env.nsteps().saturating_sub(1),
            )?;

            Ok(())
        })?;

        Ok(path)
    }
}

/// Draws a row of `ncells` charts into an SVG file.
fn render<F>(path: &Path, ncells: usize, draw: F) -> anyhow::Result<()>
where
    F: FnOnce(&[DrawingArea<SVGBackend<'_>, Shift>]) -> anyhow::Result<()>,
{
    let root = SVGBackend::new(path, (CELL_SIZE * ncells as u32, CELL_SIZE)).into_drawing_area();
    root.fill(&WHITE)?;

    draw(&root.split_evenly((1, ncells)))?;

    root.present()?;
    info!("wrote {}", path.display());
    Ok(())
}

type Agents<M, L, O> = (SgdAgent<M, L, O>, SgdAgent<M, L, O>, Vec<f32>);

/// Builds the online agent, its offline counterpart running every epoch of the experiment in a
/// single update, and the initial parameters they share.
fn build_agents<M, L, O>(
    config: &ExperimentConfig,
    env: &SequentialDataEnvironment,
    rng: &mut StdRng,
    model: M,
    loss_fn: L,
    optimizer: O,
    classification: bool,
) -> anyhow::Result<Agents<M, L, O>>
where
    M: Model + Clone,
    L: LossFn + Copy,
    O: Optimizer + Copy,
{
    for &t in config.timesteps.iter().filter(|&&t| t >= env.nsteps()) {
        warn!("timestep {t} is past the last step {}, it won't be plotted", env.nsteps());
    }

    let init = ParamInit::Normal { mean: 0., std: 1. }.generate(rng, model.size())?;

    let online = SgdAgentConfig {
        classification,
        obs_noise: config.obs_noise,
        ..config.agent.clone()
    };
    let offline = SgdAgentConfig {
        nepochs: online.nepochs * env.nsteps().max(1),
        buffer_size: None,
        ..online.clone()
    };

    let agent = SgdAgent::new(model.clone(), loss_fn, optimizer, online)?;
    let offline_agent = SgdAgent::new(model, loss_fn, optimizer, offline)?;

    Ok((agent, offline_agent, init))
}

fn plotted_column(config: &ExperimentConfig, t: usize) -> Option<usize> {
    config.timesteps.iter().position(|&step| step == t)
}

/// A square mesh over the raw features of every sample, expanded into polynomial features.
fn decision_grid(
    env: &SequentialDataEnvironment,
    degree: usize,
    size: usize,
) -> anyhow::Result<Array2<f32>> {
    let (x_train, x_test) = (env.x_train(), env.x_test());
    if x_train.ncols() < 3 {
        bail!(
            "decision surfaces need 2 raw features, the inputs only have {} columns",
            x_train.ncols()
        );
    }

    let (min1, max1) = extent(x_train.column(1), x_test.column(1));
    let (min2, max2) = extent(x_train.column(2), x_test.column(2));

    Ok(polynomial_features(
        grid_2d((min1, min2), (max1, max2), size).view(),
        degree,
    ))
}

fn extent(a: ArrayView1<f32>, b: ArrayView1<f32>) -> (f32, f32) {
    a.iter()
        .chain(b.iter())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
