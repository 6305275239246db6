//! Axum route handlers for stored evaluations and reports.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluations::report::{render_report, ReportInput};
use crate::evaluations::store::{
    fetch_evaluation, fetch_history, save_evaluation, DEFAULT_HISTORY_LIMIT,
};
use crate::matching::scoring::FinalResult;
use crate::models::evaluation::{EvaluationRow, NewEvaluation};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body shared by save and report: a scored result plus its file context.
#[derive(Debug, Deserialize)]
pub struct EvaluationRecordRequest {
    #[serde(default)]
    pub candidate_name: Option<String>,
    pub resume_file: String,
    pub jd_file: String,
    pub result: FinalResult,
    #[serde(default)]
    pub feedback: String,
}

impl EvaluationRecordRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.resume_file.trim().is_empty() {
            return Err(AppError::Validation("resume_file cannot be empty".to_string()));
        }
        let scores = [
            ("final_score", self.result.final_score),
            ("hard_score", self.result.hard_score),
            ("soft_score", self.result.soft_score),
        ];
        for (name, value) in scores {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(AppError::Validation(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub evaluations: Vec<EvaluationRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations
pub async fn handle_save_evaluation(
    State(state): State<AppState>,
    Json(request): Json<EvaluationRecordRequest>,
) -> Result<(StatusCode, Json<EvaluationRow>), AppError> {
    request.validate()?;

    let new = NewEvaluation::from_result(
        request.candidate_name.as_deref(),
        &request.resume_file,
        &request.jd_file,
        &request.result,
        &request.feedback,
    );
    let row = save_evaluation(&state.db, new).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/evaluations?limit=N
///
/// Stored evaluations, newest first.
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit < 1 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    let evaluations = fetch_history(&state.db, limit).await?;

    Ok(Json(HistoryResponse { evaluations }))
}

/// GET /api/v1/evaluations/:id
pub async fn handle_get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationRow>, AppError> {
    let row = fetch_evaluation(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Evaluation {id} not found")))?;

    Ok(Json(row))
}

/// POST /api/v1/reports
///
/// Renders a downloadable Markdown report. Nothing is stored.
pub async fn handle_report(
    Json(request): Json<EvaluationRecordRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let candidate_name = NewEvaluation::from_result(
        request.candidate_name.as_deref(),
        &request.resume_file,
        &request.jd_file,
        &request.result,
        &request.feedback,
    )
    .candidate_name;

    let markdown = render_report(&ReportInput {
        candidate_name: &candidate_name,
        resume_file: &request.resume_file,
        jd_file: &request.jd_file,
        result: &request.result,
        feedback: &request.feedback,
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"evaluation_report.md\"",
            ),
        ],
        markdown,
    ))
}
