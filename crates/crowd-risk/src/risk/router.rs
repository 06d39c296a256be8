use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::report::ReportFormatter;
use super::repository::{AssessmentId, AssessmentRepository, RepositoryError};
use super::service::{AssessmentRequest, AssessmentServiceError, RiskAssessmentService};

const DEFAULT_RECENT_LIMIT: usize = 20;
const MAX_RECENT_LIMIT: usize = 100;

/// Router builder exposing HTTP endpoints for risk assessments.
pub fn assessment_router<R>(service: Arc<RiskAssessmentService<R>>) -> Router
where
    R: AssessmentRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/risk/assessments",
            post(assess_handler::<R>).get(recent_handler::<R>),
        )
        .route(
            "/api/v1/risk/assessments/:assessment_id",
            get(status_handler::<R>),
        )
        .route("/api/v1/risk/model", get(model_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecentQuery {
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn assess_handler<R>(
    State(service): State<Arc<RiskAssessmentService<R>>>,
    axum::Json(request): axum::Json<AssessmentRequest>,
) -> Result<Response, AppError>
where
    R: AssessmentRepository + 'static,
{
    let record = service.assess(request)?;
    let view = ReportFormatter::new().view(&record);
    Ok((StatusCode::CREATED, axum::Json(view)).into_response())
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<RiskAssessmentService<R>>>,
    Path(assessment_id): Path<String>,
) -> Result<Response, AppError>
where
    R: AssessmentRepository + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.get(&id) {
        Ok(record) => {
            let view = ReportFormatter::new().view(&record);
            Ok((StatusCode::OK, axum::Json(view)).into_response())
        }
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "assessment not found",
                "assessment_id": id.0,
            });
            Ok((StatusCode::NOT_FOUND, axum::Json(payload)).into_response())
        }
        Err(other) => Err(other.into()),
    }
}

pub(crate) async fn recent_handler<R>(
    State(service): State<Arc<RiskAssessmentService<R>>>,
    Query(query): Query<RecentQuery>,
) -> Result<Response, AppError>
where
    R: AssessmentRepository + 'static,
{
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);
    let records = service.recent(limit)?;
    let formatter = ReportFormatter::new();
    let views: Vec<_> = records.iter().map(|record| formatter.view(record)).collect();
    Ok((StatusCode::OK, axum::Json(views)).into_response())
}

pub(crate) async fn model_handler<R>(
    State(service): State<Arc<RiskAssessmentService<R>>>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.config().clone())).into_response()
}
