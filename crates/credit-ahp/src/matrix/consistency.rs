use serde::Serialize;

use super::random_index::RandomIndexTable;
use super::{PairwiseMatrix, WeightVector};

/// Saaty's acceptance threshold; a matrix passes only when its CR is strictly below it.
pub const CONSISTENCY_RATIO_THRESHOLD: f64 = 0.10;

/// Consistency metrics for one pairwise matrix and its weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsistencyResult {
    pub order: usize,
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub random_index: f64,
    pub consistency_ratio: f64,
    pub is_consistent: bool,
}

pub fn within_threshold(consistency_ratio: f64) -> bool {
    consistency_ratio < CONSISTENCY_RATIO_THRESHOLD
}

/// Estimate the principal eigenvalue and derive CI and CR.
///
/// `lambda_max` is the mean of `(M . w)_i / w_i`. Orders 1 and 2 have a Random
/// Index of zero and are therefore always consistent.
pub fn consistency(
    matrix: &PairwiseMatrix,
    weights: &WeightVector,
    random_index: &RandomIndexTable,
) -> ConsistencyResult {
    let order = matrix.order();
    let weighted_sum = matrix.multiply(weights.as_slice());
    let lambda_max = weighted_sum
        .iter()
        .zip(weights.iter())
        .map(|(sum, weight)| sum / weight)
        .sum::<f64>()
        / order as f64;

    let consistency_index = if order > 1 {
        (lambda_max - order as f64) / (order as f64 - 1.0)
    } else {
        0.0
    };

    let random_index = random_index.lookup(order);
    let consistency_ratio = if random_index > 0.0 {
        consistency_index / random_index
    } else {
        0.0
    };

    ConsistencyResult {
        order,
        lambda_max,
        consistency_index,
        random_index,
        consistency_ratio,
        is_consistent: within_threshold(consistency_ratio),
    }
}
