//! Axum route handlers for the Matching API.

use std::path::Path;

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::extract_text_from_bytes;
use crate::matching::jd_parser::{parse_jd, JobRequirements};
use crate::matching::normalize::normalize_text;
use crate::matching::pipeline::{
    evaluate, rank_candidates, ranking_to_csv, CandidateDocument, Evaluation, RankingRow,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParseJdRequest {
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseJdResponse {
    pub requirements: JobRequirements,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateTextRequest {
    #[serde(default)]
    pub resume_text: String,
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateFilesResponse {
    pub resume_file: String,
    pub jd_file: String,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankQuery {
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub jd_file: String,
    pub rankings: Vec<RankingRow>,
}

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
struct UploadedFile {
    field: String,
    file_name: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/parse-jd
///
/// Extracts role title and must-have / good-to-have lines from a raw JD.
pub async fn handle_parse_jd(
    Json(request): Json<ParseJdRequest>,
) -> Result<Json<ParseJdResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let requirements = parse_jd(&normalize_text(&request.jd_text), None);

    Ok(Json(ParseJdResponse { requirements }))
}

/// POST /api/v1/evaluate/text
///
/// Scores pasted resume text against pasted JD text.
pub async fn handle_evaluate_text(
    State(state): State<AppState>,
    Json(request): Json<EvaluateTextRequest>,
) -> Result<Json<Evaluation>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let evaluation = evaluate(
        &request.resume_text,
        &request.jd_text,
        None,
        &state.vocabulary,
        &state.semantic,
    )
    .await?;

    Ok(Json(evaluation))
}

/// POST /api/v1/evaluate
///
/// Multipart: one `resume` file and one `job_description` file (PDF, DOCX or text).
pub async fn handle_evaluate_files(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluateFilesResponse>, AppError> {
    let mut uploads = read_uploads(multipart).await?;

    let resume = take_single(&mut uploads, "resume")?;
    let jd = take_single(&mut uploads, "job_description")?;

    let resume_text = extract_upload(resume.clone()).await?;
    let jd_text = extract_upload(jd.clone()).await?;
    if jd_text.trim().is_empty() {
        warn!(jd_file = %jd.file_name, "Job description produced no text");
    }

    let evaluation = evaluate(
        &resume_text,
        &jd_text,
        Some(Path::new(&jd.file_name)),
        &state.vocabulary,
        &state.semantic,
    )
    .await?;

    info!(
        resume_file = %resume.file_name,
        jd_file = %jd.file_name,
        final_score = evaluation.result.final_score,
        verdict = %evaluation.result.verdict,
        "Evaluated resume"
    );

    Ok(Json(EvaluateFilesResponse {
        resume_file: resume.file_name,
        jd_file: jd.file_name,
        evaluation,
    }))
}

/// POST /api/v1/rank[?format=csv]
///
/// Multipart: one `job_description` file plus any number of `resumes` files.
/// Every uploaded resume appears in the output, best match first.
pub async fn handle_rank(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let as_csv = match query.format.as_deref() {
        None | Some("json") => false,
        Some("csv") => true,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unsupported format '{other}', expected 'json' or 'csv'"
            )))
        }
    };

    let mut uploads = read_uploads(multipart).await?;
    let jd = take_single(&mut uploads, "job_description")?;
    let jd_text = extract_upload(jd.clone()).await?;

    let mut candidates = Vec::new();
    for upload in uploads.into_iter().filter(|u| u.field == "resumes") {
        let name = upload.file_name.clone();
        let text = extract_upload(upload).await?;
        candidates.push(CandidateDocument { name, text });
    }

    let rankings = rank_candidates(
        &jd_text,
        Some(Path::new(&jd.file_name)),
        candidates,
        &state.vocabulary,
        &state.semantic,
    )
    .await;

    if as_csv {
        let csv = ranking_to_csv(&rankings)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"ranking.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(RankResponse {
        jd_file: jd.file_name,
        rankings,
    })
    .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Upload helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{name}.txt"));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;

        uploads.push(UploadedFile {
            field: name,
            file_name,
            bytes,
        });
    }

    Ok(uploads)
}

fn take_single(uploads: &mut Vec<UploadedFile>, field: &str) -> Result<UploadedFile, AppError> {
    let index = uploads
        .iter()
        .position(|u| u.field == field)
        .ok_or_else(|| AppError::Validation(format!("Missing multipart field '{field}'")))?;
    Ok(uploads.remove(index))
}

/// PDF parsing is CPU-bound; keep it off the async workers.
async fn extract_upload(upload: UploadedFile) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_text_from_bytes(&upload.file_name, &upload.bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}
