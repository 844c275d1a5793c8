use credit_ahp::config::ScoringConfig;
use credit_ahp::error::AppError;
use credit_ahp::scoring::{
    CreditScoringService, EngineOptions, HierarchyDefinition, TracingObserver,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Hierarchy from `path`, falling back to the configured path and then the
/// built-in farmer hierarchy.
pub(crate) fn load_definition(
    path: Option<&Path>,
    config: &ScoringConfig,
) -> Result<HierarchyDefinition, AppError> {
    match path.or(config.hierarchy_path.as_deref()) {
        Some(path) => {
            let definition = HierarchyDefinition::from_path(path)?;
            info!(
                path = %path.display(),
                hierarchy = %definition.name,
                "hierarchy definition loaded"
            );
            Ok(definition)
        }
        None => Ok(HierarchyDefinition::farmer_credit()),
    }
}

pub(crate) fn build_service(
    definition: &HierarchyDefinition,
    config: &ScoringConfig,
) -> Result<CreditScoringService, AppError> {
    let service = CreditScoringService::with_observer(
        definition,
        EngineOptions::from(config),
        Arc::new(TracingObserver),
    )?;
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_hierarchy_is_used_without_a_path() {
        let definition =
            load_definition(None, &ScoringConfig::default()).expect("built-in definition");
        assert_eq!(definition.name, "farmer-credit");

        let service = build_service(&definition, &ScoringConfig::default()).expect("service");
        assert!(service.current().is_usable());
    }

    #[test]
    fn missing_definition_files_are_io_errors() {
        let config = ScoringConfig {
            hierarchy_path: Some("/nonexistent/credit-ahp/hierarchy.json".into()),
            ..ScoringConfig::default()
        };

        let err = load_definition(None, &config).unwrap_err();
        assert!(matches!(err, AppError::Definition(_)));
    }
}
