//! Criterion hierarchy, weight composition, and eligibility decisions.
//!
//! A [`ScoringEngine`] is built once from a [`HierarchyDefinition`]. Each
//! evaluation is a lookup over the cached leaf weights, and
//! [`CreditScoringService`] publishes replacement engines atomically.

pub mod engine;
pub mod hierarchy;
pub mod import;
pub mod observer;
pub mod policy;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use engine::{
    ApplicantScores, CategoryContribution, ConsistencyReport, EngineOptions, LeafWeight,
    ScoreBreakdown, ScoreScale, ScoringEngine, MAIN_MATRIX_LABEL, PERCENTAGE_DECIMALS,
};
pub use hierarchy::{
    category_prefix, CategoryCode, CategoryDefinition, DefinitionLoadError, HierarchyDefinition,
    HierarchyError, LeafId, TopLevelWeights,
};
pub use import::{ApplicantBatchImporter, ApplicantImportError, ApplicantRow};
pub use observer::{ConstructionObserver, GateOutcome, TracingObserver};
pub use policy::{is_eligible, EligibilityVerdict, ScoreFailure, ELIGIBILITY_THRESHOLD};
pub use router::credit_router;
pub use service::{CreditScoringService, ServiceError};
