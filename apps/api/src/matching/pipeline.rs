//! Evaluation pipeline: normalize, parse the JD, detect skills, score, then feedback.
//!
//! `evaluate` handles one resume. `rank_candidates` scores many resumes
//! against one JD, encoding the JD once, and never drops a candidate: a
//! resume that cannot be scored is kept with placeholder scores and an error.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::feedback::generate_feedback;
use crate::matching::jd_parser::{parse_jd, JobRequirements};
use crate::matching::normalize::normalize_text;
use crate::matching::scoring::{final_score, final_score_with_jd_embedding, FinalResult, Verdict};
use crate::matching::semantic::SemanticMatcher;
use crate::matching::skills::{detect_skills, SkillVocabulary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub requirements: JobRequirements,
    pub result: FinalResult,
    pub feedback: String,
}

/// Scores one resume against one job description. Inputs are raw extracted text.
pub async fn evaluate(
    resume_raw: &str,
    jd_raw: &str,
    jd_source: Option<&Path>,
    vocabulary: &SkillVocabulary,
    semantic: &SemanticMatcher,
) -> Result<Evaluation, AppError> {
    let resume_text = normalize_text(resume_raw);
    let jd_text = normalize_text(jd_raw);

    let requirements = parse_jd(&jd_text, jd_source);
    let resume_skills = detect_skills(&resume_text, vocabulary);
    let result = final_score(resume_skills, &requirements, &resume_text, &jd_text, semantic).await?;
    let feedback = generate_feedback(&requirements, &result);

    Ok(Evaluation {
        requirements,
        result,
        feedback,
    })
}

/// One resume in a batch: display name plus its extracted text.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub candidate: String,
    pub final_score: f64,
    pub verdict: Verdict,
    pub hard_score: f64,
    pub soft_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Set when the candidate could not be scored; scores are then zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RankingRow {
    fn scored(candidate: String, result: FinalResult) -> Self {
        let missing_skills = result.missing_requirements();
        RankingRow {
            candidate,
            final_score: result.final_score,
            verdict: result.verdict,
            hard_score: result.hard_score,
            soft_score: result.soft_score,
            matched_skills: result.resume_skills.to_vec(),
            missing_skills,
            error: None,
        }
    }

    fn unscored(candidate: String, matched_skills: Vec<String>, error: String) -> Self {
        RankingRow {
            candidate,
            final_score: 0.0,
            verdict: Verdict::Low,
            hard_score: 0.0,
            soft_score: 0.0,
            matched_skills,
            missing_skills: Vec::new(),
            error: Some(error),
        }
    }
}

/// Ranks every candidate against the JD, highest final score first.
/// The output is always a permutation of the input candidates.
pub async fn rank_candidates(
    jd_raw: &str,
    jd_source: Option<&Path>,
    candidates: Vec<CandidateDocument>,
    vocabulary: &SkillVocabulary,
    semantic: &SemanticMatcher,
) -> Vec<RankingRow> {
    let jd_text = normalize_text(jd_raw);
    let requirements = parse_jd(&jd_text, jd_source);

    let jd_embedding = match semantic.embed(&jd_text).await {
        Ok(embedding) => Some(embedding),
        Err(e) => {
            warn!("Job description could not be encoded, all candidates unscored: {e}");
            None
        }
    };

    let total = candidates.len();
    let mut rows = Vec::with_capacity(total);

    for candidate in candidates {
        let resume_text = normalize_text(&candidate.text);
        if resume_text.is_empty() {
            warn!(candidate = %candidate.name, "Resume text is empty; scoring as-is");
        }
        let resume_skills = detect_skills(&resume_text, vocabulary);

        let row = match &jd_embedding {
            Some(jd_embedding) => {
                match final_score_with_jd_embedding(
                    resume_skills.clone(),
                    &requirements,
                    &resume_text,
                    jd_embedding,
                    semantic,
                )
                .await
                {
                    Ok(result) => RankingRow::scored(candidate.name, result),
                    Err(e) => {
                        warn!(candidate = %candidate.name, "Skipping scoring: {e}");
                        RankingRow::unscored(candidate.name, resume_skills.to_vec(), e.to_string())
                    }
                }
            }
            None => RankingRow::unscored(
                candidate.name,
                resume_skills.to_vec(),
                "Scoring unavailable: job description could not be encoded".to_string(),
            ),
        };
        rows.push(row);
    }

    // stable: ties keep upload order
    rows.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    info!(
        role = %requirements.role_title,
        total,
        failed,
        "Ranked candidates"
    );

    rows
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Candidate")]
    candidate: &'a str,
    #[serde(rename = "Final Score")]
    final_score: f64,
    #[serde(rename = "Verdict")]
    verdict: &'static str,
    #[serde(rename = "Hard Score")]
    hard_score: f64,
    #[serde(rename = "Soft Score")]
    soft_score: f64,
    #[serde(rename = "Matched Skills")]
    matched_skills: String,
    #[serde(rename = "Missing Skills")]
    missing_skills: String,
    #[serde(rename = "Error")]
    error: &'a str,
}

/// CSV export of a ranking, rows in the given order.
pub fn ranking_to_csv(rows: &[RankingRow]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(CsvRow {
            candidate: &row.candidate,
            final_score: row.final_score,
            verdict: row.verdict.as_str(),
            hard_score: row.hard_score,
            soft_score: row.soft_score,
            matched_skills: row.matched_skills.join(", "),
            missing_skills: row.missing_skills.join(", "),
            error: row.error.as_deref().unwrap_or(""),
        })?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush failed: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}
