use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::engine::ApplicantScores;
use super::hierarchy::HierarchyDefinition;
use super::service::{CreditScoringService, ServiceError};
use crate::matrix::{self, MatrixError, PairwiseMatrix};

/// Router builder exposing evaluation, consistency, reload, and matrix analysis endpoints.
pub fn credit_router(service: Arc<CreditScoringService>) -> Router {
    Router::new()
        .route("/api/v1/credit/evaluate", post(evaluate_handler))
        .route("/api/v1/credit/consistency", get(consistency_handler))
        .route("/api/v1/credit/hierarchy", put(reload_handler))
        .route("/api/v1/ahp/analyze", post(analyze_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    pub(crate) scores: ApplicantScores,
}

/// Either a full matrix or the upper-triangle judgments of one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AnalyzeRequest {
    Matrix { matrix: Vec<Vec<f64>> },
    Judgments { order: usize, judgments: Vec<f64> },
}

impl AnalyzeRequest {
    fn into_matrix(self) -> Result<PairwiseMatrix, MatrixError> {
        match self {
            AnalyzeRequest::Matrix { matrix } => PairwiseMatrix::new(matrix),
            AnalyzeRequest::Judgments { order, judgments } => {
                PairwiseMatrix::from_judgments(order, &judgments)
            }
        }
    }
}

pub(crate) async fn evaluate_handler(
    State(service): State<Arc<CreditScoringService>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response {
    let verdict = service.evaluate(&request.scores);
    (StatusCode::OK, axum::Json(verdict)).into_response()
}

pub(crate) async fn consistency_handler(
    State(service): State<Arc<CreditScoringService>>,
) -> Response {
    let engine = service.current();
    let payload = json!({
        "hierarchy": engine.name(),
        "usable": engine.is_usable(),
        "summary": engine.consistency_summary(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn reload_handler(
    State(service): State<Arc<CreditScoringService>>,
    axum::Json(definition): axum::Json<HierarchyDefinition>,
) -> Response {
    match service.reload(&definition) {
        Ok(engine) => {
            let payload = json!({
                "hierarchy": engine.name(),
                "usable": engine.is_usable(),
                "summary": engine.consistency_summary(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(ServiceError::Hierarchy(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn analyze_handler(
    State(service): State<Arc<CreditScoringService>>,
    axum::Json(request): axum::Json<AnalyzeRequest>,
) -> Response {
    match request.into_matrix() {
        Ok(matrix) => {
            let analysis = matrix::analyze(&matrix, &service.options().random_index);
            (StatusCode::OK, axum::Json(analysis)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
