//! Terminal strategies and the sequential reference implementations.
//!
//! [`scalar`] and [`cubic`] are the leaves the distribution engine bottoms
//! out in. [`schoolbook`] and [`sequential_strassen`] are never used by the
//! engine; they exist to check its output.

use ndarray::{Array2, Axis};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::error::Result;
use crate::matrix::Matrix;
use crate::strassen::{operands, recombine, PRODUCTS};
use crate::ORACLE_THRESHOLD;

/// Below this dimension [`schoolbook`] stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 128;

/// 1×1 product.
#[inline(always)]
pub fn scalar(a: &Matrix, b: &Matrix) -> Matrix {
    Matrix::scalar(a.get(0, 0).wrapping_mul(b.get(0, 0)))
}

/// Triple-loop product of two n×n matrices. Wraps on `i32` overflow.
pub fn cubic(a: &Matrix, b: &Matrix) -> Matrix {
    let n = a.size();
    let (a, b) = (a.view(), b.view());
    let mut c = Array2::<i32>::zeros((n, n));

    for i in 0..n {
        for k in 0..n {
            let aik = a[[i, k]];
            for j in 0..n {
                c[[i, j]] = c[[i, j]].wrapping_add(aik.wrapping_mul(b[[k, j]]));
            }
        }
    }

    Matrix::from(c)
}

/// Schoolbook product with rows computed in parallel for large n.
pub fn schoolbook(a: &Matrix, b: &Matrix) -> Matrix {
    let n = a.size();
    if n < PARALLEL_THRESHOLD {
        return cubic(a, b);
    }

    let (av, bv) = (a.view(), b.view());
    let mut c = Array2::<i32>::zeros((n, n));

    c.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            for k in 0..n {
                let aik = av[[i, k]];
                for (j, cij) in row.iter_mut().enumerate() {
                    *cij = cij.wrapping_add(aik.wrapping_mul(bv[[k, j]]));
                }
            }
        });

    Matrix::from(c)
}

/// Single-rank Strassen with a cubic cut-off at [`ORACLE_THRESHOLD`].
pub fn sequential_strassen(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let n = a.size();
    if n == 1 {
        return Ok(scalar(a, b));
    }
    if n <= ORACLE_THRESHOLD {
        return Ok(cubic(a, b));
    }

    let (qa, qb) = (a.split(), b.split());
    let products = (0..PRODUCTS)
        .map(|i| {
            let (left, right) = operands(&qa, &qb, i)?;
            sequential_strassen(&left, &right)
        })
        .collect::<Result<Vec<_>>>()?;

    recombine(&products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let a = Matrix::from_rows(&[[6]]).unwrap();
        let b = Matrix::from_rows(&[[-7]]).unwrap();
        assert_eq!(scalar(&a, &b).flatten(), vec![-42]);
    }

    #[test]
    fn test_cubic_small() {
        let a = Matrix::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let b = Matrix::from_rows(&[[5, 6], [7, 8]]).unwrap();
        assert_eq!(cubic(&a, &b).flatten(), vec![19, 22, 43, 50]);
    }

    #[test]
    fn test_cubic_identity() {
        let a = Matrix::random(16, 3);
        assert_eq!(cubic(&a, &Matrix::identity(16)), a);
        assert_eq!(cubic(&Matrix::identity(16), &a), a);
    }

    #[test]
    fn test_schoolbook_parallel_matches_cubic() {
        let a = Matrix::random(PARALLEL_THRESHOLD, 10);
        let b = Matrix::random(PARALLEL_THRESHOLD, 11);
        assert_eq!(schoolbook(&a, &b), cubic(&a, &b));
    }

    #[test]
    fn test_sequential_strassen_matches_cubic() {
        for n in [1, 2, 32, 64, 128] {
            let a = Matrix::random(n, 123);
            let b = Matrix::random(n, 456);
            assert_eq!(
                sequential_strassen(&a, &b).unwrap(),
                cubic(&a, &b),
                "n = {}",
                n
            );
        }
    }

    #[test]
    fn test_products_wrap_on_overflow() {
        let big = Matrix::from_rows(&[[i32::MAX]]).unwrap();
        let two = Matrix::from_rows(&[[2]]).unwrap();
        assert_eq!(scalar(&big, &two).flatten(), vec![-2]);

        // every cell is 2 * (MAX * MAX), wrapped
        let a = Matrix::from_rows(&[[i32::MAX, i32::MAX], [i32::MAX, i32::MAX]]).unwrap();
        let cell = i32::MAX.wrapping_mul(i32::MAX).wrapping_mul(2);
        assert_eq!(cubic(&a, &a).flatten(), vec![cell; 4]);
    }

    #[test]
    fn test_wrapping_strassen_agrees_with_cubic() {
        let n = PARALLEL_THRESHOLD;
        let flat: Vec<i32> = (0..n * n)
            .map(|i| i32::MAX - (i as i32).wrapping_mul(7919))
            .collect();
        let a = Matrix::unflatten(flat.clone(), n).unwrap();
        let b = Matrix::unflatten(flat.into_iter().rev().collect(), n).unwrap();

        let expected = cubic(&a, &b);
        assert_eq!(schoolbook(&a, &b), expected);
        assert_eq!(sequential_strassen(&a, &b).unwrap(), expected);
    }
}
