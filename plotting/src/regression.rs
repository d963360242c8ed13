use log::debug;
use machine_learning::{Agent, environment::SequentialDataEnvironment};
use ndarray::Axis;
use plotters::{coord::Shift, prelude::*};
use rand::Rng;

use crate::{PlotErr, Result, agent_color, error::drawing, sort_data};

const PREVIOUS_POINTS: RGBColor = RGBColor(0x40, 0x47, 0x6d);
const CURRENT_POINTS: RGBColor = RGBColor(0xc3, 0x31, 0x49);
const GROUND_TRUTH: RGBColor = RGBColor(0x72, 0xa2, 0x76);

/// Plots an agent's posterior predictive over the test points seen up to step `t`.
///
/// # Arguments
/// * `area` - The drawing area to plot on.
/// * `rng` - A random number generator, handed to the agent's prediction.
/// * `agent` - The agent whose belief is plotted.
/// * `env` - The regression environment, its inputs having the raw `x` in column 1.
/// * `belief` - The agent's belief at step `t`.
/// * `agent_name` - The agent's family, picking its color.
/// * `t` - The current step.
///
/// # Returns
/// An error if the agent is unknown, the prediction fails or the backend can't draw.
pub fn plot_regression_posterior_predictive<DB, A, R>(
    area: &DrawingArea<DB, Shift>,
    rng: &mut R,
    agent: &mut A,
    env: &SequentialDataEnvironment,
    belief: &A::Belief,
    agent_name: &str,
    t: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    A: Agent,
    R: Rng + ?Sized,
{
    let color = agent_color(agent_name)?;
    let (x, y) = env.test_until(t);

    if x.ncols() < 2 {
        return Err(PlotErr::SizeMismatch {
            what: "regression features",
            got: x.ncols(),
            expected: 2,
        });
    }

    let ground_truth = env.ground_truth();
    if ground_truth.nrows() != x.ncols() {
        return Err(PlotErr::SizeMismatch {
            what: "ground truth weights",
            got: ground_truth.nrows(),
            expected: x.ncols(),
        });
    }

    let nprev = (t * env.test_batch_size()).min(x.nrows());
    let points: Vec<(f32, f32)> = x
        .column(1)
        .iter()
        .copied()
        .zip(y.column(0).iter().copied())
        .collect();

    let (x_sorted, _) = sort_data(x, y)?;
    let (mu, sigma) = agent.predict(rng, belief, x_sorted.view())?;
    let truth = x_sorted.dot(&ground_truth);

    if mu.ncols() == 0 || sigma.ncols() == 0 {
        return Err(PlotErr::SizeMismatch {
            what: "prediction columns",
            got: 0,
            expected: 1,
        });
    }

    let xs = x_sorted.column(1);
    let mu = mu.index_axis(Axis(1), 0);
    let sigma = sigma.index_axis(Axis(1), 0);

    let x_range = padded_range(xs.iter().copied());
    let y_range = padded_range(
        points
            .iter()
            .map(|&(_, y)| y)
            .chain(truth.iter().copied())
            .chain(mu.iter().zip(&sigma).flat_map(|(&m, &s)| [m - s, m + s])),
    );

    debug!(
        "plotting {agent_name} at step {t}: {} previous and {} current points",
        nprev,
        points.len() - nprev
    );

    let mut chart = ChartBuilder::on(area)
        .caption(format!("{agent_name}, t = {t}"), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(drawing)?;

    chart.configure_mesh().draw().map_err(drawing)?;

    chart
        .draw_series(
            points[..nprev]
                .iter()
                .map(|&p| Circle::new(p, 3, PREVIOUS_POINTS.filled())),
        )
        .map_err(drawing)?;

    chart
        .draw_series(
            points[nprev..]
                .iter()
                .map(|&p| Circle::new(p, 3, CURRENT_POINTS.filled())),
        )
        .map_err(drawing)?;

    chart
        .draw_series(LineSeries::new(
            xs.iter().copied().zip(truth.column(0).iter().copied()),
            GROUND_TRUTH.stroke_width(2),
        ))
        .map_err(drawing)?;

    let band = |sign: f32| -> Vec<(f32, f32)> {
        xs.iter()
            .zip(&mu)
            .zip(&sigma)
            .map(|((&x, &m), &s)| (x, m + sign * s))
            .collect()
    };
    let (upper, lower) = (band(1.), band(-1.));

    chart
        .draw_series(std::iter::once(Polygon::new(
            upper.iter().chain(lower.iter().rev()).copied().collect::<Vec<_>>(),
            color.mix(0.2).filled(),
        )))
        .map_err(drawing)?;

    chart
        .draw_series(
            xs.iter()
                .zip(&mu)
                .zip(&sigma)
                .map(|((&x, &m), &s)| {
                    ErrorBar::new_vertical(x, m - s, m, m + s, color.filled(), 4)
                }),
        )
        .map_err(drawing)?;

    chart
        .draw_series(LineSeries::new(
            xs.iter().copied().zip(mu.iter().copied()),
            color.stroke_width(2),
        ))
        .map_err(drawing)?;

    Ok(())
}

/// The smallest range holding every finite value, padded by 5% on both ends.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f32>) -> std::ops::Range<f32> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        return -1.0..1.0;
    }

    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1. };
    (lo - pad)..(hi + pad)
}
