use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::hierarchy::{
    category_prefix, CategoryCode, HierarchyDefinition, HierarchyError, TopLevelWeights,
};
use super::observer::{ConstructionObserver, GateOutcome};
use super::policy::{decide_verdict, EligibilityVerdict, ScoreFailure};
use crate::config::ScoringConfig;
use crate::matrix::{self, ConsistencyResult, RandomIndexTable};

/// Applicant answers keyed by leaf identifier.
pub type ApplicantScores = BTreeMap<String, f64>;

/// Label used for the top-level matrix in derived-weight hierarchies.
pub const MAIN_MATRIX_LABEL: &str = "Main";

/// Percentages are rounded to this many decimal places before they are
/// compared against the eligibility threshold.
pub const PERCENTAGE_DECIMALS: i32 = 9;

fn round_percentage(value: f64) -> f64 {
    let scale = 10f64.powi(PERCENTAGE_DECIMALS);
    (value * scale).round() / scale
}

/// Canonical range of a leaf score. Zero marks an unselected option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreScale {
    pub min: f64,
    pub max: f64,
}

impl ScoreScale {
    pub const CANONICAL: ScoreScale = ScoreScale { min: 0.0, max: 5.0 };

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Construction options for [`ScoringEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineOptions {
    pub random_index: RandomIndexTable,
}

impl From<&ScoringConfig> for EngineOptions {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            random_index: RandomIndexTable::new(config.random_index_fallback),
        }
    }
}

/// Consistency outcome for one named matrix in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub label: String,
    pub result: ConsistencyResult,
}

impl ConsistencyReport {
    pub fn summary_line(&self) -> String {
        let status = if self.result.is_consistent {
            "CONSISTENT"
        } else {
            "INCONSISTENT"
        };
        format!(
            "{}: {} (CR = {:.3})",
            self.label, status, self.result.consistency_ratio
        )
    }
}

/// Combined weight of one leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeafWeight {
    pub leaf_weight: f64,
    pub category_weight: f64,
}

impl LeafWeight {
    pub fn global(&self) -> f64 {
        self.leaf_weight * self.category_weight
    }
}

#[derive(Debug, Clone)]
struct WeightMap {
    leaves: BTreeMap<String, LeafWeight>,
    categories: BTreeMap<String, f64>,
}

#[derive(Debug, Clone)]
struct CategoryMeta {
    code: CategoryCode,
    label: String,
}

/// Weighted contribution of one category to a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryContribution {
    pub category: CategoryCode,
    pub label: String,
    pub weighted_total: f64,
    pub maximum: f64,
}

/// Successful score with the raw weighted total, its attainable maximum, and
/// the resulting percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub weighted_total: f64,
    pub maximum: f64,
    pub percentage: f64,
    pub categories: Vec<CategoryContribution>,
}

/// Immutable scoring engine built from a hierarchy definition.
///
/// Every matrix is checked once at construction. Leaf weights are cached only
/// when all of them pass; a single inconsistent matrix leaves the engine
/// without any weights and every score request fails.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    name: String,
    categories: Vec<CategoryMeta>,
    reports: Vec<ConsistencyReport>,
    weights: Option<WeightMap>,
}

impl ScoringEngine {
    pub fn construct(
        definition: &HierarchyDefinition,
        options: &EngineOptions,
    ) -> Result<Self, HierarchyError> {
        Self::build(definition, options, None)
    }

    pub fn construct_observed(
        definition: &HierarchyDefinition,
        options: &EngineOptions,
        observer: &dyn ConstructionObserver,
    ) -> Result<Self, HierarchyError> {
        Self::build(definition, options, Some(observer))
    }

    fn build(
        definition: &HierarchyDefinition,
        options: &EngineOptions,
        observer: Option<&dyn ConstructionObserver>,
    ) -> Result<Self, HierarchyError> {
        definition.validate()?;

        let mut reports = Vec::with_capacity(definition.categories.len() + 1);

        let category_weights: Vec<f64> = match &definition.top_level {
            TopLevelWeights::Fixed { weights } => definition
                .categories
                .iter()
                .map(|category| weights.get(&category.code).copied().unwrap_or_default())
                .collect(),
            TopLevelWeights::Derived { matrix: top_level } => {
                let analysis = matrix::analyze(top_level, &options.random_index);
                reports.push(ConsistencyReport {
                    label: MAIN_MATRIX_LABEL.to_string(),
                    result: analysis.consistency,
                });
                analysis.weights.into()
            }
        };

        let mut leaf_weights = Vec::with_capacity(definition.categories.len());
        for category in &definition.categories {
            let analysis = matrix::analyze(&category.matrix, &options.random_index);
            reports.push(ConsistencyReport {
                label: category.code.to_string(),
                result: analysis.consistency,
            });
            leaf_weights.push(analysis.weights);
        }

        if let Some(observer) = observer {
            for report in &reports {
                observer.matrix_checked(&definition.name, report);
            }
        }

        let failing: Vec<String> = reports
            .iter()
            .filter(|report| !report.result.is_consistent)
            .map(|report| report.label.clone())
            .collect();

        let weights = if failing.is_empty() {
            let mut leaves = BTreeMap::new();
            let mut categories = BTreeMap::new();
            for ((category, vector), category_weight) in definition
                .categories
                .iter()
                .zip(&leaf_weights)
                .zip(&category_weights)
            {
                categories.insert(category.code.to_string(), *category_weight);
                for (leaf_id, leaf_weight) in category.leaf_ids().into_iter().zip(vector.iter()) {
                    leaves.insert(
                        leaf_id.to_string(),
                        LeafWeight {
                            leaf_weight,
                            category_weight: *category_weight,
                        },
                    );
                }
            }
            Some(WeightMap { leaves, categories })
        } else {
            None
        };

        if let Some(observer) = observer {
            let outcome = match &weights {
                Some(map) => GateOutcome::Usable {
                    leaves: map.leaves.len(),
                },
                None => GateOutcome::Disabled {
                    failing: failing.clone(),
                },
            };
            observer.gate_decided(&definition.name, &outcome);
        }

        Ok(Self {
            name: definition.name.clone(),
            categories: definition
                .categories
                .iter()
                .map(|category| CategoryMeta {
                    code: category.code.clone(),
                    label: category.label.clone(),
                })
                .collect(),
            reports,
            weights,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether every matrix passed and leaf weights are available.
    pub fn is_usable(&self) -> bool {
        self.weights.is_some()
    }

    pub fn consistency_reports(&self) -> &[ConsistencyReport] {
        &self.reports
    }

    pub fn consistency_summary(&self) -> Vec<String> {
        self.reports
            .iter()
            .map(ConsistencyReport::summary_line)
            .collect()
    }

    pub fn failing_matrices(&self) -> Vec<String> {
        self.reports
            .iter()
            .filter(|report| !report.result.is_consistent)
            .map(|report| report.label.clone())
            .collect()
    }

    /// Known leaf identifiers; empty when scoring is disabled.
    pub fn leaf_ids(&self) -> Vec<&str> {
        self.weights
            .as_ref()
            .map(|map| map.leaves.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn leaf_weight(&self, leaf: &str) -> Option<LeafWeight> {
        self.weights
            .as_ref()
            .and_then(|map| map.leaves.get(leaf).copied())
    }

    pub fn category_weight(&self, code: &str) -> Option<f64> {
        self.weights
            .as_ref()
            .and_then(|map| map.categories.get(code).copied())
    }

    pub fn score(&self, scores: &ApplicantScores) -> Result<ScoreBreakdown, ScoreFailure> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| ScoreFailure::InconsistentConfiguration {
                failing: self.failing_matrices(),
            })?;

        let malformed: Vec<String> = scores
            .keys()
            .filter(|key| category_prefix(key).is_none())
            .cloned()
            .collect();
        if !malformed.is_empty() {
            return Err(ScoreFailure::MalformedKey { keys: malformed });
        }

        let unknown: Vec<String> = scores
            .keys()
            .filter(|key| !weights.leaves.contains_key(*key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ScoreFailure::UnknownCriteria { keys: unknown });
        }

        let scale = ScoreScale::CANONICAL;
        if let Some((key, value)) = scores.iter().find(|(_, value)| !scale.contains(**value)) {
            return Err(ScoreFailure::OutOfRange {
                key: key.clone(),
                value: *value,
                min: scale.min,
                max: scale.max,
            });
        }

        let mut total = 0.0;
        let mut maximum = 0.0;
        let mut per_category: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

        for (key, raw_score) in scores {
            let category = category_prefix(key).ok_or_else(|| ScoreFailure::MalformedKey {
                keys: vec![key.clone()],
            })?;
            let leaf_weight = weights
                .leaves
                .get(key)
                .map(|leaf| leaf.leaf_weight)
                .ok_or_else(|| ScoreFailure::UnknownCriteria {
                    keys: vec![key.clone()],
                })?;
            let category_weight = weights.categories.get(category).copied().ok_or_else(|| {
                ScoreFailure::UnknownCriteria {
                    keys: vec![key.clone()],
                }
            })?;

            let earned = leaf_weight * category_weight * raw_score;
            let attainable = leaf_weight * category_weight * scale.max;
            total += earned;
            maximum += attainable;

            let entry = per_category.entry(category).or_insert((0.0, 0.0));
            entry.0 += earned;
            entry.1 += attainable;
        }

        if maximum <= 0.0 {
            return Err(ScoreFailure::DegenerateMaximum);
        }

        let categories = self
            .categories
            .iter()
            .filter_map(|meta| {
                per_category
                    .get(meta.code.as_str())
                    .map(|(earned, attainable)| CategoryContribution {
                        category: meta.code.clone(),
                        label: meta.label.clone(),
                        weighted_total: *earned,
                        maximum: *attainable,
                    })
            })
            .collect();

        Ok(ScoreBreakdown {
            weighted_total: total,
            maximum,
            percentage: round_percentage(100.0 * total / maximum),
            categories,
        })
    }

    pub fn eligibility(&self, scores: &ApplicantScores) -> EligibilityVerdict {
        self.eligibility_at(scores, Utc::now())
    }

    pub fn eligibility_at(
        &self,
        scores: &ApplicantScores,
        evaluated_at: DateTime<Utc>,
    ) -> EligibilityVerdict {
        decide_verdict(self.score(scores), self.consistency_summary(), evaluated_at)
    }
}
