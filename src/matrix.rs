//! Owned square integer matrices and the quadrant / flat-buffer transforms
//! used at every recursion level and at every rank boundary.

use std::fmt;
use std::ops::{Add, Sub};

use ndarray::{s, Array2, ArrayView2, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{validation_error, Result};

/// An owned n×n matrix of `i32`.
///
/// Storage is an [`ndarray::Array2`] in standard (row-major) layout. The
/// matrix is dropped by whichever frame created it. Entry arithmetic wraps
/// on `i32` overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    data: Array2<i32>,
}

/// The four (n/2)×(n/2) blocks of a matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quadrants {
    pub top_left: Matrix,
    pub top_right: Matrix,
    pub bottom_left: Matrix,
    pub bottom_right: Matrix,
}

impl Matrix {
    /// Creates an n×n matrix filled with zeros.
    pub fn zeros(n: usize) -> Self {
        Matrix {
            data: Array2::zeros((n, n)),
        }
    }

    /// Creates a 1×1 matrix holding `value`.
    pub fn scalar(value: i32) -> Self {
        Matrix {
            data: Array2::from_elem((1, 1), value),
        }
    }

    /// Creates the n×n identity matrix.
    pub fn identity(n: usize) -> Self {
        Matrix {
            data: Array2::eye(n),
        }
    }

    /// Creates an n×n matrix whose entries are drawn from `0..10`.
    ///
    /// The same `seed` always yields the same matrix.
    pub fn random(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Matrix {
            data: Array2::from_shape_simple_fn((n, n), || rng.random_range(0..10)),
        }
    }

    /// Builds a matrix from its rows.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the rows do not form a square matrix.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self> {
        let n = rows.len();
        let mut flat = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(validation_error(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            flat.extend_from_slice(row);
        }
        Matrix::unflatten(flat, n)
    }

    /// Rebuilds an n×n matrix from a row-major buffer of exactly n² values.
    ///
    /// Inverse of [`Matrix::flatten`].
    pub fn unflatten(buffer: Vec<i32>, n: usize) -> Result<Self> {
        if buffer.len() != n * n {
            return Err(validation_error(format!(
                "flat buffer holds {} values, a {}x{} matrix needs {}",
                buffer.len(),
                n,
                n,
                n * n
            )));
        }
        Ok(Matrix {
            data: Array2::from_shape_vec((n, n), buffer)?,
        })
    }

    /// Linearizes the matrix into n² values in row-major order.
    pub fn flatten(&self) -> Vec<i32> {
        self.data.iter().copied().collect()
    }

    /// Dimension n of this n×n matrix.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[[row, col]]
    }

    pub fn view(&self) -> ArrayView2<'_, i32> {
        self.data.view()
    }

    /// Splits an n×n matrix (n even) into its four (n/2)×(n/2) quadrants.
    pub fn split(&self) -> Quadrants {
        let k = self.size() / 2;
        let block = |rows: std::ops::Range<usize>, cols: std::ops::Range<usize>| Matrix {
            data: self.data.slice(s![rows, cols]).to_owned(),
        };
        Quadrants {
            top_left: block(0..k, 0..k),
            top_right: block(0..k, k..2 * k),
            bottom_left: block(k..2 * k, 0..k),
            bottom_right: block(k..2 * k, k..2 * k),
        }
    }

    /// Places four k×k quadrants into a 2k×2k matrix. Inverse of [`Matrix::split`].
    pub fn combine(quadrants: &Quadrants) -> Self {
        let k = quadrants.top_left.size();
        let mut data = Array2::zeros((2 * k, 2 * k));
        data.slice_mut(s![..k, ..k]).assign(&quadrants.top_left.data);
        data.slice_mut(s![..k, k..]).assign(&quadrants.top_right.data);
        data.slice_mut(s![k.., ..k]).assign(&quadrants.bottom_left.data);
        data.slice_mut(s![k.., k..]).assign(&quadrants.bottom_right.data);
        Matrix { data }
    }
}

impl From<Array2<i32>> for Matrix {
    fn from(data: Array2<i32>) -> Self {
        debug_assert!(data.is_square());
        Matrix { data }
    }
}

impl Add<&Matrix> for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        Matrix {
            data: Zip::from(&self.data)
                .and(&rhs.data)
                .map_collect(|x, y| x.wrapping_add(*y)),
        }
    }
}

impl Add<&Matrix> for Matrix {
    type Output = Matrix;

    fn add(mut self, rhs: &Matrix) -> Matrix {
        Zip::from(&mut self.data)
            .and(&rhs.data)
            .for_each(|x, &y| *x = x.wrapping_add(y));
        self
    }
}

impl Sub<&Matrix> for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        Matrix {
            data: Zip::from(&self.data)
                .and(&rhs.data)
                .map_collect(|x, y| x.wrapping_sub(*y)),
        }
    }
}

impl Sub<&Matrix> for Matrix {
    type Output = Matrix;

    fn sub(mut self, rhs: &Matrix) -> Matrix {
        Zip::from(&mut self.data)
            .and(&rhs.data)
            .for_each(|x, &y| *x = x.wrapping_sub(y));
        self
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.rows() {
            for value in row {
                write!(f, "{:4} ", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
