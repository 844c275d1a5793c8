use serde::Serialize;

/// Saaty's Random Index for matrices of order 1 through 10.
pub const SAATY_RANDOM_INDEX: [f64; 10] = [
    0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49,
];

/// Random Index used for orders beyond the tabulated range.
pub const DEFAULT_RANDOM_INDEX_FALLBACK: f64 = 1.49;

/// Random Index lookup with a configurable value past the end of the table.
///
/// Only built through [`RandomIndexTable::new`], which rejects unusable fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RandomIndexTable {
    fallback: f64,
}

impl RandomIndexTable {
    pub fn new(fallback: f64) -> Self {
        let sanitized = if fallback.is_finite() && fallback > 0.0 {
            fallback
        } else {
            DEFAULT_RANDOM_INDEX_FALLBACK
        };

        Self {
            fallback: sanitized,
        }
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn lookup(&self, order: usize) -> f64 {
        match order {
            0 => 0.0,
            n => SAATY_RANDOM_INDEX
                .get(n - 1)
                .copied()
                .unwrap_or(self.fallback),
        }
    }
}

impl Default for RandomIndexTable {
    fn default() -> Self {
        Self::new(DEFAULT_RANDOM_INDEX_FALLBACK)
    }
}
