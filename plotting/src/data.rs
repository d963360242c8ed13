use ndarray::{Array2, ArrayView2, Axis};

use crate::{PlotErr, Result};

/// Sorts the rows of `x` and `y` by the value of their first non constant feature, so a line
/// drawn through them is monotonic in `x`.
///
/// # Arguments
/// * `x` - The inputs, column 0 being the bias when there's more than one feature.
/// * `y` - The targets, one row per input.
///
/// # Returns
/// Sorted copies of both arrays, equal keys keeping their relative order.
pub fn sort_data(x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<(Array2<f32>, Array2<f32>)> {
    if x.nrows() != y.nrows() {
        return Err(PlotErr::SizeMismatch {
            what: "target rows",
            got: y.nrows(),
            expected: x.nrows(),
        });
    }

    let key = match x.ncols() {
        0 => return Ok((x.to_owned(), y.to_owned())),
        1 => 0,
        _ => 1,
    };

    let mut indices: Vec<usize> = (0..x.nrows()).collect();
    indices.sort_by(|&a, &b| x[[a, key]].total_cmp(&x[[b, key]]));

    Ok((x.select(Axis(0), &indices), y.select(Axis(0), &indices)))
}

/// Builds a row-major `n × n` mesh over the rectangle spanned by `min` and `max`.
///
/// Row `i * n + j` holds the point `(x_j, y_i)`, both axes evenly spaced with the bounds
/// included.
pub fn grid_2d(min: (f32, f32), max: (f32, f32), n: usize) -> Array2<f32> {
    let step = |lo: f32, hi: f32| if n > 1 { (hi - lo) / (n - 1) as f32 } else { 0. };
    let (dx, dy) = (step(min.0, max.0), step(min.1, max.1));

    Array2::from_shape_fn((n * n, 2), |(k, c)| match c {
        0 => min.0 + dx * (k % n) as f32,
        _ => min.1 + dy * (k / n) as f32,
    })
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn sorts_by_the_raw_feature_column() {
        let x = array![[1., 0.5, 0.25], [1., -1., 1.], [1., 2., 4.]];
        let y = array![[10.], [20.], [30.]];

        let (xs, ys) = sort_data(x.view(), y.view()).unwrap();

        assert_eq!(xs, array![[1., -1., 1.], [1., 0.5, 0.25], [1., 2., 4.]]);
        assert_eq!(ys, array![[20.], [10.], [30.]]);
    }

    #[test]
    fn single_feature_sorts_by_column_zero_and_is_stable() {
        let x = array![[3.], [1.], [3.], [2.]];
        let y = array![[0.], [1.], [2.], [3.]];

        let (xs, ys) = sort_data(x.view(), y.view()).unwrap();

        assert_eq!(xs, array![[1.], [2.], [3.], [3.]]);
        assert_eq!(ys, array![[1.], [3.], [0.], [2.]]);
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let x = Array2::<f32>::zeros((3, 2));
        let y = Array2::<f32>::zeros((2, 1));

        assert!(matches!(
            sort_data(x.view(), y.view()),
            Err(PlotErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }

    #[test]
    fn grid_is_row_major_and_includes_bounds() {
        let grid = grid_2d((-1., 0.), (1., 4.), 3);

        assert_eq!(grid.dim(), (9, 2));
        assert_eq!(grid.row(0).to_vec(), vec![-1., 0.]);
        assert_eq!(grid.row(1).to_vec(), vec![0., 0.]);
        assert_eq!(grid.row(3).to_vec(), vec![-1., 2.]);
        assert_eq!(grid.row(8).to_vec(), vec![1., 4.]);
    }
}
