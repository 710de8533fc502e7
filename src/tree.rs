//! Static process-tree addressing.
//!
//! Rank `r` owns candidate children `7r + 1 ..= 7r + 7`, one per Strassen
//! product. Nothing is stored: every lookup recomputes the formula, and a
//! candidate is only a child when it is below the total rank count.

use crate::config::EngineConfig;
use crate::strassen::PRODUCTS;

/// Candidate rank for `product` under `rank`, whether or not it exists.
#[inline(always)]
pub fn candidate_rank(rank: usize, product: usize) -> usize {
    rank * PRODUCTS + product + 1
}

/// The child rank that computes `product` for `rank`, if that rank exists.
#[inline(always)]
pub fn child_rank(rank: usize, product: usize, total: usize) -> Option<usize> {
    let candidate = candidate_rank(rank, product);
    (candidate < total).then_some(candidate)
}

/// All seven candidate ranks of `rank`, ordered by product index.
pub fn candidate_children(rank: usize) -> [usize; PRODUCTS] {
    std::array::from_fn(|product| candidate_rank(rank, product))
}

/// The rank that delegates to `rank`; `None` for the root.
pub fn parent_rank(rank: usize) -> Option<usize> {
    (rank > 0).then(|| (rank - 1) / PRODUCTS)
}

/// Whether a node of dimension `n` at `level` on `rank` hands products to children.
///
/// True iff `n` exceeds the leaf threshold, `level` is below the maximum
/// tree height, and the first candidate child exists.
pub fn should_delegate(
    config: &EngineConfig,
    n: usize,
    level: usize,
    total: usize,
    rank: usize,
) -> bool {
    if n <= config.leaf_threshold {
        return false;
    }

    if level >= config.max_tree_height {
        return false;
    }

    child_rank(rank, 0, total).is_some()
}
