use chrono::{DateTime, Utc};
use serde::Serialize;

use super::engine::ScoreBreakdown;

/// Minimum percentage (inclusive) for a loan to be granted.
pub const ELIGIBILITY_THRESHOLD: f64 = 70.0;

/// Reason a score could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ScoreFailure {
    #[error("inconsistent matrices: {}", failing.join(", "))]
    InconsistentConfiguration { failing: Vec<String> },
    #[error("unrecognized criteria: {}", keys.join(", "))]
    UnknownCriteria { keys: Vec<String> },
    #[error("malformed criterion keys: {}", keys.join(", "))]
    MalformedKey { keys: Vec<String> },
    #[error("score {value} for {key} is outside the accepted range {min}..={max}")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("no attainable score: the weighted maximum is zero")]
    DegenerateMaximum,
}

impl ScoreFailure {
    pub fn code(&self) -> &'static str {
        match self {
            ScoreFailure::InconsistentConfiguration { .. } => "inconsistent_configuration",
            ScoreFailure::UnknownCriteria { .. } => "unknown_criteria",
            ScoreFailure::MalformedKey { .. } => "malformed_key",
            ScoreFailure::OutOfRange { .. } => "out_of_range",
            ScoreFailure::DegenerateMaximum => "degenerate_maximum",
        }
    }

    pub fn summary(&self) -> String {
        match self {
            ScoreFailure::InconsistentConfiguration { .. } => {
                format!("Cannot calculate score: {self}")
            }
            other => format!("Score calculation failed: {other}"),
        }
    }
}

/// Decision handed back to the form collaborator.
///
/// The consistency summary is attached on every path so a rejected applicant
/// can be traced back to the matrix that disabled scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityVerdict {
    pub score: Option<f64>,
    pub eligible: bool,
    pub message: String,
    pub consistency_summary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ScoreFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    pub evaluated_at: DateTime<Utc>,
}

impl EligibilityVerdict {
    pub fn reason_code(&self) -> Option<&'static str> {
        self.failure.as_ref().map(ScoreFailure::code)
    }
}

pub fn is_eligible(percentage: f64) -> bool {
    percentage >= ELIGIBILITY_THRESHOLD
}

pub(crate) fn decide_verdict(
    result: Result<ScoreBreakdown, ScoreFailure>,
    consistency_summary: Vec<String>,
    evaluated_at: DateTime<Utc>,
) -> EligibilityVerdict {
    match result {
        Ok(breakdown) => {
            let eligible = is_eligible(breakdown.percentage);
            let message = if eligible {
                "Eligible for loan"
            } else {
                "Not eligible for loan"
            };

            EligibilityVerdict {
                score: Some(breakdown.percentage),
                eligible,
                message: message.to_string(),
                consistency_summary,
                failure: None,
                breakdown: Some(breakdown),
                evaluated_at,
            }
        }
        Err(failure) => EligibilityVerdict {
            score: None,
            eligible: false,
            message: failure.summary(),
            consistency_summary,
            failure: Some(failure),
            breakdown: None,
            evaluated_at,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(is_eligible(70.0));
        assert!(is_eligible(99.5));
        assert!(!is_eligible(69.999));
    }

    #[test]
    fn failures_carry_stable_codes_and_messages() {
        let failure = ScoreFailure::UnknownCriteria {
            keys: vec!["ZZZ99".to_string()],
        };
        assert_eq!(failure.code(), "unknown_criteria");
        assert_eq!(
            failure.summary(),
            "Score calculation failed: unrecognized criteria: ZZZ99"
        );

        let failure = ScoreFailure::InconsistentConfiguration {
            failing: vec!["U3".to_string()],
        };
        assert_eq!(
            failure.summary(),
            "Cannot calculate score: inconsistent matrices: U3"
        );
    }

    #[test]
    fn failure_verdict_has_no_score() {
        let verdict = decide_verdict(
            Err(ScoreFailure::DegenerateMaximum),
            vec!["U1: CONSISTENT (CR = 0.000)".to_string()],
            Utc::now(),
        );

        assert_eq!(verdict.score, None);
        assert!(!verdict.eligible);
        assert_eq!(verdict.reason_code(), Some("degenerate_maximum"));
        assert_eq!(verdict.consistency_summary.len(), 1);
    }

    #[test]
    fn failures_serialize_with_code_tag() {
        let value = serde_json::to_value(ScoreFailure::MalformedKey {
            keys: vec!["U".to_string()],
        })
        .expect("serializes");

        assert_eq!(value["code"], "malformed_key");
        assert_eq!(value["keys"][0], "U");
    }
}
