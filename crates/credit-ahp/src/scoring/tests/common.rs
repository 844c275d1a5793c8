use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::matrix::PairwiseMatrix;
use crate::scoring::engine::{ApplicantScores, ConsistencyReport, EngineOptions, ScoringEngine};
use crate::scoring::hierarchy::{
    CategoryCode, CategoryDefinition, HierarchyDefinition, TopLevelWeights,
};
use crate::scoring::observer::{ConstructionObserver, GateOutcome};

pub(super) fn code(raw: &str) -> CategoryCode {
    CategoryCode::parse(raw).expect("valid category code")
}

pub(super) fn matrix(rows: Vec<Vec<f64>>) -> PairwiseMatrix {
    PairwiseMatrix::new(rows).expect("valid pairwise matrix")
}

pub(super) fn uniform_pair() -> PairwiseMatrix {
    matrix(vec![vec![1.0, 1.0], vec![1.0, 1.0]])
}

/// Reciprocal but cyclic: 1 beats 2, 2 beats 3, 3 beats 1.
pub(super) fn cyclic_matrix() -> PairwiseMatrix {
    matrix(vec![
        vec![1.0, 9.0, 1.0 / 9.0],
        vec![1.0 / 9.0, 1.0, 9.0],
        vec![9.0, 1.0 / 9.0, 1.0],
    ])
}

pub(super) fn category(raw: &str, letter: char, matrix: PairwiseMatrix) -> CategoryDefinition {
    CategoryDefinition {
        code: code(raw),
        label: format!("{raw} criteria"),
        leaf_letter: letter,
        leaves: (1..=matrix.order())
            .map(|index| format!("{raw} criterion {index}"))
            .collect(),
        matrix,
    }
}

pub(super) fn fixed_weights(entries: &[(&str, f64)]) -> TopLevelWeights {
    TopLevelWeights::Fixed {
        weights: entries
            .iter()
            .map(|(raw, weight)| (code(raw), *weight))
            .collect(),
    }
}

/// Two categories weighted 0.5 each, two equally weighted leaves per category.
pub(super) fn two_category_definition() -> HierarchyDefinition {
    HierarchyDefinition {
        name: "two-category".to_string(),
        categories: vec![
            category("U1", 'A', uniform_pair()),
            category("U2", 'B', uniform_pair()),
        ],
        top_level: fixed_weights(&[("U1", 0.5), ("U2", 0.5)]),
    }
}

pub(super) fn derived_definition() -> HierarchyDefinition {
    HierarchyDefinition {
        name: "derived".to_string(),
        top_level: TopLevelWeights::Derived {
            matrix: uniform_pair(),
        },
        ..two_category_definition()
    }
}

pub(super) fn inconsistent_definition() -> HierarchyDefinition {
    HierarchyDefinition {
        name: "inconsistent".to_string(),
        categories: vec![
            category("U1", 'A', uniform_pair()),
            category("U3", 'C', cyclic_matrix()),
        ],
        top_level: fixed_weights(&[("U1", 0.5), ("U3", 0.5)]),
    }
}

pub(super) fn two_category_engine() -> ScoringEngine {
    ScoringEngine::construct(&two_category_definition(), &EngineOptions::default())
        .expect("hierarchy is well formed")
}

pub(super) fn farmer_engine() -> ScoringEngine {
    ScoringEngine::construct(&HierarchyDefinition::farmer_credit(), &EngineOptions::default())
        .expect("standard hierarchy is well formed")
}

pub(super) fn uniform_scores(value: f64) -> ApplicantScores {
    ["U1A1", "U1A2", "U2B1", "U2B2"]
        .into_iter()
        .map(|key| (key.to_string(), value))
        .collect()
}

pub(super) fn scores(entries: &[(&str, f64)]) -> ApplicantScores {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect::<BTreeMap<_, _>>()
}

pub(super) fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} within {tolerance}, got {actual}"
    );
}

#[derive(Default)]
pub(super) struct RecordingObserver {
    checked: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<GateOutcome>>,
}

impl RecordingObserver {
    pub(super) fn checked(&self) -> Vec<String> {
        self.checked.lock().expect("observer mutex poisoned").clone()
    }

    pub(super) fn outcomes(&self) -> Vec<GateOutcome> {
        self.outcomes.lock().expect("observer mutex poisoned").clone()
    }
}

impl ConstructionObserver for RecordingObserver {
    fn matrix_checked(&self, _hierarchy: &str, report: &ConsistencyReport) {
        self.checked
            .lock()
            .expect("observer mutex poisoned")
            .push(report.label.clone());
    }

    fn gate_decided(&self, _hierarchy: &str, outcome: &GateOutcome) {
        self.outcomes
            .lock()
            .expect("observer mutex poisoned")
            .push(outcome.clone());
    }
}

pub(super) fn recording_observer() -> Arc<RecordingObserver> {
    Arc::new(RecordingObserver::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
