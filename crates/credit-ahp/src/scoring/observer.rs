use tracing::{debug, info, warn};

use super::engine::ConsistencyReport;

/// Outcome of the all-or-nothing consistency gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Usable { leaves: usize },
    Disabled { failing: Vec<String> },
}

/// Opt-in diagnostics hook invoked while an engine is being constructed.
pub trait ConstructionObserver: Send + Sync {
    fn matrix_checked(&self, hierarchy: &str, report: &ConsistencyReport);
    fn gate_decided(&self, hierarchy: &str, outcome: &GateOutcome);
}

/// Forwards construction diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ConstructionObserver for TracingObserver {
    fn matrix_checked(&self, hierarchy: &str, report: &ConsistencyReport) {
        debug!(
            hierarchy,
            matrix = %report.label,
            order = report.result.order,
            lambda_max = report.result.lambda_max,
            consistency_index = report.result.consistency_index,
            consistency_ratio = report.result.consistency_ratio,
            consistent = report.result.is_consistent,
            "pairwise matrix checked"
        );
    }

    fn gate_decided(&self, hierarchy: &str, outcome: &GateOutcome) {
        match outcome {
            GateOutcome::Usable { leaves } => {
                info!(hierarchy, leaves, "all matrices consistent; scoring enabled")
            }
            GateOutcome::Disabled { failing } => warn!(
                hierarchy,
                failing = %failing.join(", "),
                "inconsistent matrices; scoring disabled"
            ),
        }
    }
}
