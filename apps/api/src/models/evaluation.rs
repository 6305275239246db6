use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::scoring::Verdict;

/// One stored evaluation. `missing_skills` is missing must-haves followed by
/// missing good-to-haves.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub candidate_name: String,
    pub resume_file: String,
    pub jd_file: String,
    pub final_score: f64,
    pub hard_score: f64,
    pub soft_score: f64,
    pub verdict: String,
    pub missing_skills: Json<Vec<String>>,
    pub feedback: String,
}

/// Insert payload; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvaluation {
    pub candidate_name: String,
    pub resume_file: String,
    pub jd_file: String,
    pub final_score: f64,
    pub hard_score: f64,
    pub soft_score: f64,
    pub verdict: Verdict,
    pub missing_skills: Vec<String>,
    pub feedback: String,
}
