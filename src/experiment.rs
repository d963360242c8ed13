//! Drives agents over the steps of an environment.

use log::info;
use machine_learning::{Agent, Info, environment::SequentialDataEnvironment};
use ndarray::{ArrayView1, ArrayView2};
use rand::Rng;

/// What happened on a single step of an experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub t: usize,
    pub info: Info,
    /// Accuracy on the step's test batch, only for classification agents.
    pub accuracy: Option<f32>,
}

/// Feeds an agent the train batches of `env` one step at a time.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `agent` - The agent to train.
/// * `belief` - The agent's initial belief.
/// * `env` - The environment serving the batches.
/// * `callback` - Called after every step with the agent, its new belief and the step's report.
///
/// # Returns
/// The final belief and every step's report, or the first error found.
pub fn run_experiment<A, R, F>(
    rng: &mut R,
    agent: &mut A,
    mut belief: A::Belief,
    env: &SequentialDataEnvironment,
    mut callback: F,
) -> anyhow::Result<(A::Belief, Vec<StepReport>)>
where
    A: Agent,
    R: Rng + ?Sized,
    F: FnMut(&mut R, &mut A, &A::Belief, &StepReport) -> anyhow::Result<()>,
{
    let mut reports = Vec::with_capacity(env.nsteps());

    for t in 0..env.nsteps() {
        let (x, y) = env.get_data(t)?;
        let (new_belief, info) = agent.update(rng, belief, x, y)?;
        belief = new_belief;

        // Environments with fewer test batches than steps stop reporting accuracy.
        let accuracy = match env.get_test_data(t) {
            Ok((x_test, y_test)) if agent.classification() => {
                let (scores, _) = agent.predict(rng, &belief, x_test)?;
                Some(accuracy(scores.view(), y_test))
            }
            _ => None,
        };

        let report = StepReport { t, info, accuracy };
        match accuracy {
            Some(accuracy) => info!(t = t, loss = info.loss(), accuracy = accuracy; "step done"),
            None => info!(t = t, loss = info.loss(); "step done"),
        }

        callback(rng, agent, &belief, &report)?;
        reports.push(report);
    }

    Ok((belief, reports))
}

/// Trains an agent with the whole train set in a single update, the offline counterpart of
/// `run_experiment`.
pub fn run_offline<A, R>(
    rng: &mut R,
    agent: &mut A,
    belief: A::Belief,
    env: &SequentialDataEnvironment,
) -> anyhow::Result<(A::Belief, Info)>
where
    A: Agent,
    R: Rng + ?Sized,
{
    let (belief, info) = agent.update(rng, belief, env.x_train(), env.y_train())?;
    info!(loss = info.loss(); "offline fit done");

    Ok((belief, info))
}

/// The fraction of rows whose highest scoring column is their label.
///
/// A single column of scores holds the log-probability of class 1 of a binary problem.
pub fn accuracy(scores: ArrayView2<f32>, labels: ArrayView2<f32>) -> f32 {
    let n = scores.nrows().min(labels.nrows());
    if n == 0 {
        return 0.;
    }

    let hits = scores
        .rows()
        .into_iter()
        .zip(labels.column(0))
        .filter(|(row, label)| predicted_class(row.view()) == **label as usize)
        .count();

    hits as f32 / n as f32
}

fn predicted_class(scores: ArrayView1<f32>) -> usize {
    if let [logp] = scores.as_slice().unwrap_or_default() {
        return usize::from(*logp > 0.5f32.ln());
    }

    scores
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, s)| {
            if s > max { (i, s) } else { (best, max) }
        })
        .0
}
