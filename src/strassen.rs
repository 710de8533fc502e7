//! The seven Strassen products and the recombination of their results.
//!
//! Product `i` multiplies a left and a right operand built from the
//! quadrants of A and B:
//!
//! | i | left      | right     |
//! |---|-----------|-----------|
//! | 0 | A11 + A22 | B11 + B22 |
//! | 1 | A21 + A22 | B11       |
//! | 2 | A11       | B12 − B22 |
//! | 3 | A22       | B21 − B11 |
//! | 4 | A11 + A12 | B22       |
//! | 5 | A21 − A11 | B11 + B12 |
//! | 6 | A12 − A22 | B21 + B22 |

use crate::error::{validation_error, Result};
use crate::matrix::{Matrix, Quadrants};

/// Number of sub-products per recursion node.
pub const PRODUCTS: usize = 7;

/// Builds the two k×k operands of product `index`.
pub fn operands(a: &Quadrants, b: &Quadrants, index: usize) -> Result<(Matrix, Matrix)> {
    let pair = match index {
        0 => (
            &a.top_left + &a.bottom_right,
            &b.top_left + &b.bottom_right,
        ),
        1 => (&a.bottom_left + &a.bottom_right, b.top_left.clone()),
        2 => (a.top_left.clone(), &b.top_right - &b.bottom_right),
        3 => (a.bottom_right.clone(), &b.bottom_left - &b.top_left),
        4 => (&a.top_left + &a.top_right, b.bottom_right.clone()),
        5 => (&a.bottom_left - &a.top_left, &b.top_left + &b.top_right),
        6 => (
            &a.top_right - &a.bottom_right,
            &b.bottom_left + &b.bottom_right,
        ),
        _ => {
            return Err(validation_error(format!(
                "product index {} out of range 0..{}",
                index, PRODUCTS
            )))
        }
    };
    Ok(pair)
}

/// Combines P0..P6 into the 2k×2k product.
///
/// C11 = P0 + P3 − P4 + P6, C12 = P2 + P4, C21 = P1 + P3,
/// C22 = P0 − P1 + P2 + P5.
pub fn recombine(p: &[Matrix]) -> Result<Matrix> {
    if p.len() != PRODUCTS {
        return Err(validation_error(format!(
            "expected {} products, got {}",
            PRODUCTS,
            p.len()
        )));
    }
    let quadrants = Quadrants {
        top_left: &p[0] + &p[3] - &p[4] + &p[6],
        top_right: &p[2] + &p[4],
        bottom_left: &p[1] + &p[3],
        bottom_right: &p[0] - &p[1] + &p[2] + &p[5],
    };
    Ok(Matrix::combine(&quadrants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf;

    #[test]
    fn test_operands_reject_bad_index() {
        let q = Matrix::identity(4).split();
        assert!(operands(&q, &q, PRODUCTS).is_err());
    }

    #[test]
    fn test_one_level_matches_cubic() {
        let a = Matrix::random(8, 1);
        let b = Matrix::random(8, 2);
        let (qa, qb) = (a.split(), b.split());

        let products: Vec<Matrix> = (0..PRODUCTS)
            .map(|i| {
                let (l, r) = operands(&qa, &qb, i).unwrap();
                leaf::cubic(&l, &r)
            })
            .collect();

        assert_eq!(recombine(&products).unwrap(), leaf::cubic(&a, &b));
    }

    #[test]
    fn test_recombine_needs_seven_products() {
        let p = vec![Matrix::zeros(2); 6];
        assert!(recombine(&p).is_err());
    }
}
