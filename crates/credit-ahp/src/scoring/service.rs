use std::sync::{Arc, PoisonError, RwLock};

use super::engine::{ApplicantScores, EngineOptions, ScoringEngine};
use super::hierarchy::{HierarchyDefinition, HierarchyError};
use super::observer::ConstructionObserver;
use super::policy::EligibilityVerdict;

/// Shared entry point for evaluations with atomic hierarchy reloads.
///
/// Readers clone the current engine handle and release the lock before doing
/// any work. A reload constructs the replacement engine completely and only
/// then swaps the handle, so no caller ever sees a partially built weight map.
pub struct CreditScoringService {
    engine: RwLock<Arc<ScoringEngine>>,
    options: EngineOptions,
    observer: Option<Arc<dyn ConstructionObserver>>,
}

impl CreditScoringService {
    pub fn new(
        definition: &HierarchyDefinition,
        options: EngineOptions,
    ) -> Result<Self, ServiceError> {
        let engine = ScoringEngine::construct(definition, &options)?;
        Ok(Self {
            engine: RwLock::new(Arc::new(engine)),
            options,
            observer: None,
        })
    }

    pub fn with_observer(
        definition: &HierarchyDefinition,
        options: EngineOptions,
        observer: Arc<dyn ConstructionObserver>,
    ) -> Result<Self, ServiceError> {
        let engine = ScoringEngine::construct_observed(definition, &options, observer.as_ref())?;
        Ok(Self {
            engine: RwLock::new(Arc::new(engine)),
            options,
            observer: Some(observer),
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Snapshot of the engine currently serving requests.
    pub fn current(&self) -> Arc<ScoringEngine> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn evaluate(&self, scores: &ApplicantScores) -> EligibilityVerdict {
        self.current().eligibility(scores)
    }

    pub fn consistency_summary(&self) -> Vec<String> {
        self.current().consistency_summary()
    }

    /// Replace the hierarchy, returning the engine that was published.
    ///
    /// Structural errors leave the current engine in place. An inconsistent but
    /// well-formed hierarchy is still published; it simply refuses to score.
    pub fn reload(
        &self,
        definition: &HierarchyDefinition,
    ) -> Result<Arc<ScoringEngine>, ServiceError> {
        let engine = match &self.observer {
            Some(observer) => {
                ScoringEngine::construct_observed(definition, &self.options, observer.as_ref())?
            }
            None => ScoringEngine::construct(definition, &self.options)?,
        };
        let replacement = Arc::new(engine);
        *self.engine.write().unwrap_or_else(PoisonError::into_inner) = replacement.clone();

        Ok(replacement)
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}
