//! Persistence for evaluation results. Rows are append-only.

use std::path::Path;

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::matching::scoring::FinalResult;
use crate::models::evaluation::{EvaluationRow, NewEvaluation};

pub const DEFAULT_HISTORY_LIMIT: i64 = 100;
pub const MAX_HISTORY_LIMIT: i64 = 1000;

impl NewEvaluation {
    /// Builds the insert payload from a scored result. A blank candidate name
    /// falls back to the resume file stem.
    pub fn from_result(
        candidate_name: Option<&str>,
        resume_file: &str,
        jd_file: &str,
        result: &FinalResult,
        feedback: &str,
    ) -> Self {
        let candidate_name = candidate_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(resume_file));

        NewEvaluation {
            candidate_name,
            resume_file: resume_file.to_string(),
            jd_file: jd_file.to_string(),
            final_score: result.final_score,
            hard_score: result.hard_score,
            soft_score: result.soft_score,
            verdict: result.verdict,
            missing_skills: result.missing_requirements(),
            feedback: feedback.to_string(),
        }
    }
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| file_name.to_string())
}

/// Inserts one evaluation and returns the stored row.
pub async fn save_evaluation(
    pool: &PgPool,
    evaluation: NewEvaluation,
) -> Result<EvaluationRow, sqlx::Error> {
    let row = sqlx::query_as::<_, EvaluationRow>(
        r#"
        INSERT INTO evaluations
            (id, evaluated_at, candidate_name, resume_file, jd_file,
             final_score, hard_score, soft_score, verdict, missing_skills, feedback)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Utc::now())
    .bind(&evaluation.candidate_name)
    .bind(&evaluation.resume_file)
    .bind(&evaluation.jd_file)
    .bind(evaluation.final_score)
    .bind(evaluation.hard_score)
    .bind(evaluation.soft_score)
    .bind(evaluation.verdict.as_str())
    .bind(Json(&evaluation.missing_skills))
    .bind(&evaluation.feedback)
    .fetch_one(pool)
    .await?;

    info!(
        id = %row.id,
        candidate = %row.candidate_name,
        final_score = row.final_score,
        "Saved evaluation"
    );
    Ok(row)
}

/// Most recent evaluations first.
pub async fn fetch_history(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<EvaluationRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EvaluationRow>(
        "SELECT * FROM evaluations ORDER BY evaluated_at DESC LIMIT $1",
    )
    .bind(limit.clamp(1, MAX_HISTORY_LIMIT))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn fetch_evaluation(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<EvaluationRow>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationRow>("SELECT * FROM evaluations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::Verdict;
    use crate::matching::skills::SkillSet;

    fn result() -> FinalResult {
        FinalResult {
            resume_skills: ["Python".to_string(), "SQL".to_string()].into_iter().collect(),
            hard_score: 71.43,
            soft_score: 58.2,
            final_score: 64.82,
            verdict: Verdict::Medium,
            missing_must: vec!["- Airflow".to_string()],
            missing_good: vec!["Nice to have: dbt".to_string()],
        }
    }

    #[test]
    fn test_from_result_copies_scores_and_missing_lists() {
        let new = NewEvaluation::from_result(
            Some("  Priya Sharma "),
            "priya_cv.pdf",
            "data_engineer.txt",
            &result(),
            "⚡ Add or highlight these skills/projects in your resume: - Airflow",
        );

        assert_eq!(new.candidate_name, "Priya Sharma");
        assert_eq!(new.final_score, 64.82);
        assert_eq!(new.verdict, Verdict::Medium);
        assert_eq!(new.missing_skills, vec!["- Airflow", "Nice to have: dbt"]);
    }

    #[test]
    fn test_blank_candidate_name_falls_back_to_file_stem() {
        let new = NewEvaluation::from_result(Some("   "), "resumes/jane_doe.docx", "jd.pdf", &result(), "");
        assert_eq!(new.candidate_name, "jane_doe");

        let new = NewEvaluation::from_result(None, "cv", "jd.pdf", &result(), "");
        assert_eq!(new.candidate_name, "cv");
    }

    #[test]
    fn test_empty_result_has_no_missing_skills() {
        let empty = FinalResult {
            resume_skills: SkillSet::default(),
            hard_score: 0.0,
            soft_score: 0.0,
            final_score: 0.0,
            verdict: Verdict::Low,
            missing_must: vec![],
            missing_good: vec![],
        };
        let new = NewEvaluation::from_result(Some("x"), "x.txt", "jd.txt", &empty, "");
        assert!(new.missing_skills.is_empty());
    }
}
