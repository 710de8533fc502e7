//! Comparison of a distributed product against a reference product.

use std::fmt;

use crate::matrix::Matrix;

/// Result of comparing two matrices cell by cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Passed,
    /// The first cell, in row-major order, where the two disagree.
    Failed {
        row: usize,
        col: usize,
        expected: i32,
        actual: i32,
    },
    /// The matrices do not even have the same dimension.
    SizeMismatch { expected: usize, actual: usize },
}

impl Verification {
    pub fn passed(&self) -> bool {
        matches!(self, Verification::Passed)
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Passed => write!(f, "Verification PASSED - Results match!"),
            Verification::Failed {
                row,
                col,
                expected,
                actual,
            } => write!(
                f,
                "Verification FAILED - mismatch at [{}][{}]: distributed={}, sequential={}",
                row, col, actual, expected
            ),
            Verification::SizeMismatch { expected, actual } => write!(
                f,
                "Verification FAILED - result is {}x{}, expected {}x{}",
                actual, actual, expected, expected
            ),
        }
    }
}

/// Compares `actual` against `expected`.
pub fn verify(expected: &Matrix, actual: &Matrix) -> Verification {
    if expected.size() != actual.size() {
        return Verification::SizeMismatch {
            expected: expected.size(),
            actual: actual.size(),
        };
    }

    let n = expected.size();
    expected
        .view()
        .iter()
        .zip(actual.view().iter())
        .position(|(e, a)| e != a)
        .map_or(Verification::Passed, |idx| {
            let (row, col) = (idx / n, idx % n);
            Verification::Failed {
                row,
                col,
                expected: expected.get(row, col),
                actual: actual.get(row, col),
            }
        })
}
