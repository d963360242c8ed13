use log::debug;
use machine_learning::environment::SequentialDataEnvironment;
use ndarray::{Array2, ArrayView2};
use plotters::{coord::Shift, prelude::*};

use crate::{
    PlotErr, Result, class_color, diverging_color, error::drawing, regression::padded_range,
    sort_data,
};

const LEVELS: usize = 10;

/// Plots the probability of class 1 over a 2-D grid as a filled contour, with the train points
/// seen up to step `t` scattered on top of it.
///
/// # Arguments
/// * `area` - The drawing area to plot on.
/// * `env` - The classification environment, its labels being class indices.
/// * `grid` - A square mesh of expanded inputs, the raw coordinates in columns 1 and 2.
/// * `grid_preds` - The class probabilities of every grid point. A single column holds the
///   probability of class 1 of a binary problem.
/// * `t` - The current step.
///
/// # Returns
/// An error if the grid isn't a square mesh matching the predictions or the backend can't draw.
pub fn plot_classification_2d<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    env: &SequentialDataEnvironment,
    grid: ArrayView2<f32>,
    grid_preds: ArrayView2<f32>,
    t: usize,
) -> Result<()> {
    let (x_train, y_train) = env.train_until(t);
    let (x_train, y_train) = sort_data(x_train, y_train)?;
    let max_label = y_train.iter().fold(0., |acc: f32, &l| acc.max(l)) as usize;

    let preds = if max_label <= 1 && grid_preds.ncols() == 1 {
        Array2::from_shape_fn((grid_preds.nrows(), 2), |(i, c)| match c {
            0 => 1. - grid_preds[[i, 0]],
            _ => grid_preds[[i, 0]],
        })
    } else {
        grid_preds.to_owned()
    };

    check_shapes(grid, &preds, x_train.ncols())?;

    let side = grid.nrows().isqrt();
    let (x1, x2) = (grid.column(1), grid.column(2));
    let x_range = padded_range(x1.iter().copied());
    let y_range = padded_range(x2.iter().copied());
    let dx = span(x1.iter().copied()) / (side - 1) as f32;
    let dy = span(x2.iter().copied()) / (side - 1) as f32;

    debug!(
        "plotting a {side}x{side} decision surface at step {t} over {} train points",
        x_train.nrows()
    );

    let mut chart = ChartBuilder::on(area)
        .caption(format!("t = {t}"), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(drawing)?;

    chart.configure_mesh().draw().map_err(drawing)?;

    chart
        .draw_series(
            x1.iter()
                .zip(&x2)
                .zip(preds.column(1))
                .map(|((&x, &y), &p)| {
                    Rectangle::new(
                        [(x - dx / 2., y - dy / 2.), (x + dx / 2., y + dy / 2.)],
                        diverging_color(level(p)).filled(),
                    )
                }),
        )
        .map_err(drawing)?;

    for class in 0..=max_label {
        let color = class_color(class);
        let points = x_train
            .rows()
            .into_iter()
            .zip(y_train.column(0))
            .filter(|&(_, &label)| label as usize == class)
            .map(move |(row, _)| Circle::new((row[1], row[2]), 3, color.filled()));

        chart.draw_series(points).map_err(drawing)?;
    }

    Ok(())
}

fn check_shapes(grid: ArrayView2<f32>, preds: &Array2<f32>, train_cols: usize) -> Result<()> {
    if grid.ncols() < 3 {
        return Err(PlotErr::SizeMismatch {
            what: "grid features",
            got: grid.ncols(),
            expected: 3,
        });
    }

    if train_cols < 3 {
        return Err(PlotErr::SizeMismatch {
            what: "train features",
            got: train_cols,
            expected: 3,
        });
    }

    if preds.nrows() != grid.nrows() {
        return Err(PlotErr::SizeMismatch {
            what: "grid predictions",
            got: preds.nrows(),
            expected: grid.nrows(),
        });
    }

    if preds.ncols() < 2 {
        return Err(PlotErr::SizeMismatch {
            what: "prediction columns",
            got: preds.ncols(),
            expected: 2,
        });
    }

    let side = grid.nrows().isqrt();
    if side < 2 || side * side != grid.nrows() {
        return Err(PlotErr::SizeMismatch {
            what: "square grid points",
            got: grid.nrows(),
            expected: side.max(2).pow(2),
        });
    }

    Ok(())
}

fn span(values: impl Iterator<Item = f32>) -> f32 {
    let (lo, hi) = values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if hi > lo { hi - lo } else { 0. }
}

/// Quantizes a probability into the midpoint of one of the contour levels.
fn level(p: f32) -> f32 {
    let bin = ((p.clamp(0., 1.) * LEVELS as f32) as usize).min(LEVELS - 1);
    (bin as f32 + 0.5) / LEVELS as f32
}
