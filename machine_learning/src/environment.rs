//! Environments streaming batches of synthetic data to sequential learners.

use ndarray::{Array2, ArrayView2, Axis, s};
use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Normal, Uniform};

use crate::{MlErr, Result, initialization::distribution_err};

/// Expands every row of `x` into all of its monomials of total degree up to `degree`.
///
/// The first column is the bias (degree 0), followed by the degree 1 terms, then degree 2 and
/// so on. Terms of the same degree are ordered lexicographically by feature index, e.g. for two
/// features and degree 2: `[1, x0, x1, x0², x0·x1, x1²]`.
pub fn polynomial_features(x: ArrayView2<f32>, degree: usize) -> Array2<f32> {
    let mut terms = Vec::new();
    for d in 0..=degree {
        monomials(x.ncols(), d, 0, &mut Vec::with_capacity(d), &mut terms);
    }

    let mut out = Array2::zeros((x.nrows(), terms.len()));
    for (row, mut out_row) in x.rows().into_iter().zip(out.rows_mut()) {
        for (term, value) in terms.iter().zip(out_row.iter_mut()) {
            *value = term.iter().map(|&i| row[i]).product();
        }
    }

    out
}

fn monomials(
    nfeatures: usize,
    degree: usize,
    start: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if current.len() == degree {
        out.push(current.clone());
        return;
    }

    for i in start..nfeatures {
        current.push(i);
        monomials(nfeatures, degree, i, current, out);
        current.pop();
    }
}

/// A dataset split into train and test sets, both served sequentially in fixed-size batches.
#[derive(Debug, Clone)]
pub struct SequentialDataEnvironment {
    x_train: Array2<f32>,
    y_train: Array2<f32>,
    x_test: Array2<f32>,
    y_test: Array2<f32>,
    ground_truth: Array2<f32>,
    train_batch_size: usize,
    test_batch_size: usize,
}

impl SequentialDataEnvironment {
    /// Creates a new `SequentialDataEnvironment`.
    ///
    /// # Arguments
    /// * `x_train`, `y_train` - The train inputs and targets, one sample per row.
    /// * `x_test`, `y_test` - The test inputs and targets, one sample per row.
    /// * `ground_truth` - The weights that generated the data.
    /// * `train_batch_size`, `test_batch_size` - The amount of rows served per step.
    ///
    /// # Returns
    /// A new environment or an error if the splits are inconsistent.
    pub fn new(
        x_train: Array2<f32>,
        y_train: Array2<f32>,
        x_test: Array2<f32>,
        y_test: Array2<f32>,
        ground_truth: Array2<f32>,
        train_batch_size: usize,
        test_batch_size: usize,
    ) -> Result<Self> {
        if train_batch_size == 0 || test_batch_size == 0 {
            return Err(MlErr::InvalidConfig("batch sizes must be positive"));
        }

        check("train targets", y_train.nrows(), x_train.nrows())?;
        check("test targets", y_test.nrows(), x_test.nrows())?;
        check("test input columns", x_test.ncols(), x_train.ncols())?;

        if x_train.nrows() % train_batch_size != 0 || x_test.nrows() % test_batch_size != 0 {
            return Err(MlErr::InvalidConfig(
                "every split must hold a whole number of batches",
            ));
        }

        Ok(Self {
            x_train,
            y_train,
            x_test,
            y_test,
            ground_truth,
            train_batch_size,
            test_batch_size,
        })
    }

    /// Returns the amount of train batches.
    pub fn nsteps(&self) -> usize {
        self.x_train.nrows() / self.train_batch_size
    }

    pub fn nfeatures(&self) -> usize {
        self.x_train.ncols()
    }

    /// Returns the `t`-th train batch.
    pub fn get_data(&self, t: usize) -> Result<(ArrayView2<'_, f32>, ArrayView2<'_, f32>)> {
        let nsteps = self.nsteps();
        if t >= nsteps {
            return Err(MlErr::OutOfBounds {
                what: "timestep",
                index: t,
                len: nsteps,
            });
        }

        let rows = t * self.train_batch_size..(t + 1) * self.train_batch_size;
        Ok((
            self.x_train.slice(s![rows.clone(), ..]),
            self.y_train.slice(s![rows, ..]),
        ))
    }

    /// Returns the `t`-th test batch.
    pub fn get_test_data(&self, t: usize) -> Result<(ArrayView2<'_, f32>, ArrayView2<'_, f32>)> {
        let nbatches = self.x_test.nrows() / self.test_batch_size;
        if t >= nbatches {
            return Err(MlErr::OutOfBounds {
                what: "test batch",
                index: t,
                len: nbatches,
            });
        }

        let rows = t * self.test_batch_size..(t + 1) * self.test_batch_size;
        Ok((
            self.x_test.slice(s![rows.clone(), ..]),
            self.y_test.slice(s![rows, ..]),
        ))
    }

    /// Returns the first `t + 1` train batches.
    pub fn train_until(&self, t: usize) -> (ArrayView2<'_, f32>, ArrayView2<'_, f32>) {
        let end = ((t + 1) * self.train_batch_size).min(self.x_train.nrows());
        (
            self.x_train.slice(s![..end, ..]),
            self.y_train.slice(s![..end, ..]),
        )
    }

    /// Returns the first `t + 1` test batches.
    pub fn test_until(&self, t: usize) -> (ArrayView2<'_, f32>, ArrayView2<'_, f32>) {
        let end = ((t + 1) * self.test_batch_size).min(self.x_test.nrows());
        (
            self.x_test.slice(s![..end, ..]),
            self.y_test.slice(s![..end, ..]),
        )
    }

    pub fn x_train(&self) -> ArrayView2<'_, f32> {
        self.x_train.view()
    }

    pub fn y_train(&self) -> ArrayView2<'_, f32> {
        self.y_train.view()
    }

    pub fn x_test(&self) -> ArrayView2<'_, f32> {
        self.x_test.view()
    }

    pub fn y_test(&self) -> ArrayView2<'_, f32> {
        self.y_test.view()
    }

    pub fn ground_truth(&self) -> ArrayView2<'_, f32> {
        self.ground_truth.view()
    }

    pub fn train_batch_size(&self) -> usize {
        self.train_batch_size
    }

    pub fn test_batch_size(&self) -> usize {
        self.test_batch_size
    }
}

/// Creates a 1-D polynomial regression environment: `y = φ(x) · w + ε` with
/// `x ~ U(-2, 2)`, `w ~ N(0, 1)` and `ε ~ N(0, obs_noise)`.
///
/// Inputs are stored already expanded, so column 1 holds the raw `x`.
#[allow(clippy::too_many_arguments)]
pub fn make_random_poly_regression_environment<R: Rng + ?Sized>(
    rng: &mut R,
    degree: usize,
    ntrain: usize,
    ntest: usize,
    obs_noise: f32,
    train_batch_size: usize,
    test_batch_size: usize,
) -> Result<SequentialDataEnvironment> {
    if degree == 0 {
        return Err(MlErr::InvalidConfig("the degree must be positive"));
    }

    let uniform = Uniform::new(-2f32, 2.).map_err(distribution_err)?;
    let std_normal = Normal::new(0f32, 1.).map_err(distribution_err)?;
    let noise = Normal::new(0f32, obs_noise.sqrt()).map_err(distribution_err)?;

    let n = ntrain + ntest;
    let raw = Array2::from_shape_fn((n, 1), |_| uniform.sample(rng));
    let x = polynomial_features(raw.view(), degree);
    let w = Array2::from_shape_fn((x.ncols(), 1), |_| std_normal.sample(rng));
    let y = x.dot(&w) + Array2::from_shape_fn((n, 1), |_| noise.sample(rng));

    split(x, y, w, ntrain, train_batch_size, test_batch_size)
}

/// Creates a polynomial classification environment: inputs `x ~ N(0, I)` are expanded to
/// `φ(x)` and labelled with `argmax(φ(x) · W + ε)`, where `W ~ N(0, 1)` and `ε ~ N(0, obs_noise)`.
///
/// Labels are stored as a single column of class indices.
#[allow(clippy::too_many_arguments)]
pub fn make_random_poly_classification_environment<R: Rng + ?Sized>(
    rng: &mut R,
    degree: usize,
    ntrain: usize,
    ntest: usize,
    nfeatures: usize,
    nclasses: usize,
    obs_noise: f32,
    train_batch_size: usize,
    test_batch_size: usize,
    shuffle: bool,
) -> Result<SequentialDataEnvironment> {
    if degree == 0 {
        return Err(MlErr::InvalidConfig("the degree must be positive"));
    }

    if nfeatures == 0 {
        return Err(MlErr::InvalidConfig("there must be at least one input feature"));
    }

    if nclasses < 2 {
        return Err(MlErr::InvalidConfig("there must be at least two classes"));
    }

    let std_normal = Normal::new(0f32, 1.).map_err(distribution_err)?;
    let noise = Normal::new(0f32, obs_noise.sqrt()).map_err(distribution_err)?;

    let n = ntrain + ntest;
    let raw = Array2::from_shape_fn((n, nfeatures), |_| std_normal.sample(rng));
    let mut x = polynomial_features(raw.view(), degree);
    let w = Array2::from_shape_fn((x.ncols(), nclasses), |_| std_normal.sample(rng));
    let logits = x.dot(&w) + Array2::from_shape_fn((n, nclasses), |_| noise.sample(rng));

    let mut y = Array2::zeros((n, 1));
    for (logit, label) in logits.rows().into_iter().zip(y.iter_mut()) {
        *label = argmax(logit.iter().copied()) as f32;
    }

    if shuffle {
        let mut indices: Vec<usize> = (0..ntrain).collect();
        indices.shuffle(rng);
        indices.extend(ntrain..n);

        x = x.select(Axis(0), &indices);
        y = y.select(Axis(0), &indices);
    }

    split(x, y, w, ntrain, train_batch_size, test_batch_size)
}

fn split(
    x: Array2<f32>,
    y: Array2<f32>,
    ground_truth: Array2<f32>,
    ntrain: usize,
    train_batch_size: usize,
    test_batch_size: usize,
) -> Result<SequentialDataEnvironment> {
    let x_train = x.slice(s![..ntrain, ..]).to_owned();
    let y_train = y.slice(s![..ntrain, ..]).to_owned();
    let x_test = x.slice(s![ntrain.., ..]).to_owned();
    let y_test = y.slice(s![ntrain.., ..]).to_owned();

    SequentialDataEnvironment::new(
        x_train,
        y_train,
        x_test,
        y_test,
        ground_truth,
        train_batch_size,
        test_batch_size,
    )
}

fn argmax<I: Iterator<Item = f32>>(values: I) -> usize {
    values
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, v)| {
            if v > max { (i, v) } else { (best, max) }
        })
        .0
}

fn check(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
