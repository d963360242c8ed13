use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis, concatenate, s};

use crate::{MlErr, Result};

/// A bounded, ordered buffer of observed `(x, y)` rows.
///
/// Rows are kept in arrival order. Once more than `capacity` rows have been pushed the oldest
/// ones are evicted, so the buffer always holds the most recent ones.
#[derive(Debug, Clone)]
pub struct Memory {
    capacity: Option<NonZeroUsize>,
    x: Array2<f32>,
    y: Array2<f32>,
}

impl Memory {
    /// Creates a new empty `Memory`.
    ///
    /// # Arguments
    /// * `capacity` - The maximum amount of rows to hold, `None` for an unbounded buffer.
    ///
    /// # Returns
    /// A new `Memory` instance.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            capacity,
            x: Array2::zeros((0, 0)),
            y: Array2::zeros((0, 0)),
        }
    }

    /// Appends a batch of rows, evicting the oldest ones past the capacity.
    ///
    /// # Arguments
    /// * `x` - The inputs, one sample per row.
    /// * `y` - The targets, one sample per row.
    ///
    /// # Returns
    /// An error if `x` and `y` have a different amount of rows, or if their widths differ from
    /// the rows already in the buffer.
    pub fn push(&mut self, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<()> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::SizeMismatch {
                what: "memory targets",
                got: y.nrows(),
                expected: x.nrows(),
            });
        }

        if self.is_empty() {
            self.x = x.to_owned();
            self.y = y.to_owned();
        } else {
            check_width("memory input columns", x.ncols(), self.x.ncols())?;
            check_width("memory target columns", y.ncols(), self.y.ncols())?;

            self.x = concat(self.x.view(), x)?;
            self.y = concat(self.y.view(), y)?;
        }

        self.evict();
        Ok(())
    }

    /// Returns a view of every buffered row, the oldest first.
    pub fn view(&self) -> (ArrayView2<'_, f32>, ArrayView2<'_, f32>) {
        (self.x.view(), self.y.view())
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.x = Array2::zeros((0, 0));
        self.y = Array2::zeros((0, 0));
    }

    fn evict(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };

        let excess = self.len().saturating_sub(capacity.get());
        if excess == 0 {
            return;
        }

        self.x = self.x.slice(s![excess.., ..]).to_owned();
        self.y = self.y.slice(s![excess.., ..]).to_owned();
    }
}

fn check_width(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}

fn concat(old: ArrayView2<f32>, new: ArrayView2<f32>) -> Result<Array2<f32>> {
    concatenate(Axis(0), &[old, new]).map_err(|_| MlErr::SizeMismatch {
        what: "memory columns",
        got: new.ncols(),
        expected: old.ncols(),
    })
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use proptest::prelude::*;

    use super::*;

    fn capacity(n: usize) -> Option<NonZeroUsize> {
        NonZeroUsize::new(n)
    }

    #[test]
    fn keeps_the_most_recent_rows_in_order() {
        let mut memory = Memory::new(capacity(3));

        memory
            .push(array![[1.0], [2.0]].view(), array![[10.0], [20.0]].view())
            .unwrap();
        memory
            .push(array![[3.0], [4.0]].view(), array![[30.0], [40.0]].view())
            .unwrap();

        let (x, y) = memory.view();
        assert_eq!(x, array![[2.0], [3.0], [4.0]]);
        assert_eq!(y, array![[20.0], [30.0], [40.0]]);
    }

    #[test]
    fn unbounded_memory_keeps_everything() {
        let mut memory = Memory::new(None);

        for i in 0..10 {
            let v = i as f32;
            memory
                .push(array![[v, v]].view(), array![[v]].view())
                .unwrap();
        }

        assert_eq!(memory.len(), 10);
        assert_eq!(memory.view().0.row(9).to_vec(), [9.0, 9.0]);
    }

    #[test]
    fn rejects_rows_of_another_width() {
        let mut memory = Memory::new(None);
        memory
            .push(array![[1.0, 2.0]].view(), array![[0.0]].view())
            .unwrap();

        let res = memory.push(array![[1.0]].view(), array![[0.0]].view());

        assert!(matches!(res, Err(MlErr::SizeMismatch { got: 1, expected: 2, .. })));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn rejects_targets_with_a_different_row_count() {
        let mut memory = Memory::new(None);
        let res = memory.push(array![[1.0], [2.0]].view(), array![[0.0]].view());

        assert!(res.is_err());
        assert!(memory.is_empty());
    }

    #[test]
    fn clear_allows_a_new_width() {
        let mut memory = Memory::new(capacity(4));
        memory
            .push(array![[1.0, 2.0]].view(), array![[0.0]].view())
            .unwrap();
        memory.clear();

        memory
            .push(array![[1.0]].view(), array![[0.0]].view())
            .unwrap();
        assert_eq!(memory.len(), 1);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity_and_keeps_the_tail(
            cap in 1usize..16,
            batches in prop::collection::vec(1usize..8, 1..12),
        ) {
            let mut memory = Memory::new(capacity(cap));
            let mut pushed = Vec::new();

            for size in batches {
                let start = pushed.len();
                let xs: Vec<f32> = (start..start + size).map(|i| i as f32).collect();
                pushed.extend_from_slice(&xs);

                let x = Array2::from_shape_vec((size, 1), xs.clone()).unwrap();
                let y = x.mapv(|v| -v);
                memory.push(x.view(), y.view()).unwrap();

                prop_assert!(memory.len() <= cap);
                let expected_len = pushed.len().min(cap);
                prop_assert_eq!(memory.len(), expected_len);

                let (x, y) = memory.view();
                let tail = &pushed[pushed.len() - expected_len..];
                prop_assert_eq!(x.column(0).to_vec(), tail.to_vec());
                prop_assert_eq!(y.column(0).to_vec(), tail.iter().map(|v| -v).collect::<Vec<_>>());
            }
        }
    }
}
