//! Pairwise comparison matrices and Saaty's approximate priority method.
//!
//! A [`PairwiseMatrix`] is validated once when it is built, so [`normalize`] and
//! [`consistency`] can treat reciprocity and positivity as given.

mod consistency;
mod random_index;

pub use consistency::{
    consistency, within_threshold, ConsistencyResult, CONSISTENCY_RATIO_THRESHOLD,
};
pub use random_index::{RandomIndexTable, DEFAULT_RANDOM_INDEX_FALLBACK, SAATY_RANDOM_INDEX};

use serde::{Deserialize, Serialize};

/// Largest matrix order accepted by [`PairwiseMatrix::new`].
pub const MAX_MATRIX_ORDER: usize = 15;

/// Bounds of Saaty's 1-9 judgment scale.
pub const MIN_JUDGMENT: f64 = 1.0 / 9.0;
pub const MAX_JUDGMENT: f64 = 9.0;

const RECIPROCITY_TOLERANCE: f64 = 1e-6;
const SCALE_TOLERANCE: f64 = 1e-9;

/// Validation errors raised while building a pairwise comparison matrix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("pairwise matrix must contain at least one row")]
    Empty,
    #[error("pairwise matrix of order {order} exceeds the supported maximum of {max}")]
    TooLarge { order: usize, max: usize },
    #[error("row {row} has {found} entries, expected {expected}")]
    NotSquare {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("entry ({row}, {col}) must be a finite positive number, found {value}")]
    NonPositive { row: usize, col: usize, value: f64 },
    #[error("diagonal entry {index} must equal 1, found {value}")]
    Diagonal { index: usize, value: f64 },
    #[error("entries ({row}, {col}) and ({col}, {row}) are not reciprocal")]
    NotReciprocal { row: usize, col: usize },
    #[error("expected {expected} upper-triangle judgments, found {found}")]
    JudgmentCount { expected: usize, found: usize },
    #[error("judgment ({row}, {col}) = {value} lies outside the 1/9..9 scale")]
    JudgmentOutOfScale { row: usize, col: usize, value: f64 },
}

/// Reciprocal, unit-diagonal matrix of positive importance judgments.
///
/// Entry `(i, j)` reads "how much more important criterion `i` is than
/// criterion `j`". Instances are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct PairwiseMatrix {
    order: usize,
    entries: Vec<f64>,
}

impl PairwiseMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let order = rows.len();
        if order == 0 {
            return Err(MatrixError::Empty);
        }
        if order > MAX_MATRIX_ORDER {
            return Err(MatrixError::TooLarge {
                order,
                max: MAX_MATRIX_ORDER,
            });
        }

        let mut entries = Vec::with_capacity(order * order);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != order {
                return Err(MatrixError::NotSquare {
                    row,
                    found: values.len(),
                    expected: order,
                });
            }
            for (col, value) in values.iter().copied().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(MatrixError::NonPositive { row, col, value });
                }
            }
            entries.extend(values);
        }

        let matrix = Self { order, entries };
        matrix.check_structure()?;
        Ok(matrix)
    }

    /// Build a matrix from the upper-triangle judgments `(0,1), (0,2), .., (n-2,n-1)`,
    /// filling the lower triangle with reciprocals.
    pub fn from_judgments(order: usize, judgments: &[f64]) -> Result<Self, MatrixError> {
        if order == 0 {
            return Err(MatrixError::Empty);
        }
        if order > MAX_MATRIX_ORDER {
            return Err(MatrixError::TooLarge {
                order,
                max: MAX_MATRIX_ORDER,
            });
        }
        let expected = order * (order - 1) / 2;
        if judgments.len() != expected {
            return Err(MatrixError::JudgmentCount {
                expected,
                found: judgments.len(),
            });
        }

        let mut rows = vec![vec![1.0; order]; order];
        let mut next = judgments.iter().copied();
        for row in 0..order {
            for col in (row + 1)..order {
                let value = next.next().unwrap_or(1.0);
                if !value.is_finite()
                    || value < MIN_JUDGMENT - SCALE_TOLERANCE
                    || value > MAX_JUDGMENT + SCALE_TOLERANCE
                {
                    return Err(MatrixError::JudgmentOutOfScale { row, col, value });
                }
                rows[row][col] = value;
                rows[col][row] = 1.0 / value;
            }
        }

        Self::new(rows)
    }

    /// Perfectly consistent matrix whose entries are the ratios `v[i] / v[j]`.
    pub fn from_priorities(priorities: &[f64]) -> Result<Self, MatrixError> {
        let rows = priorities
            .iter()
            .map(|numerator| {
                priorities
                    .iter()
                    .map(|denominator| numerator / denominator)
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    pub fn identity(order: usize) -> Result<Self, MatrixError> {
        Self::new(vec![vec![1.0; order]; order])
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries[row * self.order + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.order;
        &self.entries[start..start + self.order]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.entries.chunks(self.order)
    }

    pub fn column_sums(&self) -> Vec<f64> {
        (0..self.order)
            .map(|col| self.rows().map(|row| row[col]).sum())
            .collect()
    }

    /// Column-normalized copy of the matrix: every entry divided by its column sum.
    pub fn normalized_columns(&self) -> Vec<Vec<f64>> {
        let sums = self.column_sums();
        self.rows()
            .map(|row| {
                row.iter()
                    .zip(&sums)
                    .map(|(value, sum)| value / sum)
                    .collect()
            })
            .collect()
    }

    /// Standard matrix-vector product `M . v`.
    pub fn multiply(&self, vector: &[f64]) -> Vec<f64> {
        self.rows()
            .map(|row| row.iter().zip(vector).map(|(a, b)| a * b).sum())
            .collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    fn check_structure(&self) -> Result<(), MatrixError> {
        for index in 0..self.order {
            let value = self.get(index, index);
            if (value - 1.0).abs() > RECIPROCITY_TOLERANCE {
                return Err(MatrixError::Diagonal { index, value });
            }
        }

        for row in 0..self.order {
            for col in (row + 1)..self.order {
                let product = self.get(row, col) * self.get(col, row);
                if (product - 1.0).abs() > RECIPROCITY_TOLERANCE {
                    return Err(MatrixError::NotReciprocal { row, col });
                }
            }
        }

        Ok(())
    }
}

impl TryFrom<Vec<Vec<f64>>> for PairwiseMatrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<PairwiseMatrix> for Vec<Vec<f64>> {
    fn from(matrix: PairwiseMatrix) -> Self {
        matrix.to_rows()
    }
}

/// Priority weights derived from a pairwise matrix, one per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl From<WeightVector> for Vec<f64> {
    fn from(weights: WeightVector) -> Self {
        weights.0
    }
}

/// Saaty's approximation of the principal eigenvector.
///
/// Columns are normalized to sum to one, then each row is averaged. The result
/// is not re-normalized, so floating point drift may leave the sum a hair away
/// from 1.
pub fn normalize(matrix: &PairwiseMatrix) -> WeightVector {
    let order = matrix.order() as f64;
    let weights = matrix
        .normalized_columns()
        .into_iter()
        .map(|row| row.iter().sum::<f64>() / order)
        .collect();
    WeightVector(weights)
}

/// Full audit trail for a single matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixAnalysis {
    pub order: usize,
    pub normalized: Vec<Vec<f64>>,
    pub weights: WeightVector,
    pub consistency: ConsistencyResult,
}

pub fn analyze(matrix: &PairwiseMatrix, random_index: &RandomIndexTable) -> MatrixAnalysis {
    let weights = normalize(matrix);
    let consistency = consistency(matrix, &weights, random_index);
    MatrixAnalysis {
        order: matrix.order(),
        normalized: matrix.normalized_columns(),
        weights,
        consistency,
    }
}
