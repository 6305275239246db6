//! Blends hard and soft scores into a final score and verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::encoder::Embedding;
use crate::matching::hard_match::{hard_match, HardMatchResult};
use crate::matching::jd_parser::JobRequirements;
use crate::matching::round2;
use crate::matching::semantic::SemanticMatcher;
use crate::matching::skills::SkillSet;

/// Fixed 50/50 blend. Not configurable.
pub const HARD_WEIGHT: f64 = 0.5;
pub const SOFT_WEIGHT: f64 = 0.5;

pub const HIGH_THRESHOLD: f64 = 70.0;
pub const MEDIUM_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Low,
    Medium,
    High,
}

impl Verdict {
    /// Inclusive lower bounds: ≥70 High, ≥50 Medium, else Low.
    pub fn from_score(final_score: f64) -> Self {
        if final_score >= HIGH_THRESHOLD {
            Verdict::High
        } else if final_score >= MEDIUM_THRESHOLD {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Low => "Low",
            Verdict::Medium => "Medium",
            Verdict::High => "High",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one resume vs one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub resume_skills: SkillSet,
    pub hard_score: f64,
    pub soft_score: f64,
    pub final_score: f64,
    pub verdict: Verdict,
    pub missing_must: Vec<String>,
    pub missing_good: Vec<String>,
}

impl FinalResult {
    /// Missing must-haves followed by missing good-to-haves.
    pub fn missing_requirements(&self) -> Vec<String> {
        self.missing_must
            .iter()
            .chain(&self.missing_good)
            .cloned()
            .collect()
    }
}

/// `round(hard * 0.5 + soft * 0.5, 2)`
pub fn blend(hard_score: f64, soft_score: f64) -> f64 {
    round2(hard_score * HARD_WEIGHT + soft_score * SOFT_WEIGHT)
}

/// Builds the final result from already computed hard and soft scores.
pub fn combine(resume_skills: SkillSet, hard: HardMatchResult, soft_score: f64) -> FinalResult {
    let final_score = blend(hard.score, soft_score);

    FinalResult {
        resume_skills,
        hard_score: hard.score,
        soft_score,
        final_score,
        verdict: Verdict::from_score(final_score),
        missing_must: hard.missing_must,
        missing_good: hard.missing_good,
    }
}

/// Runs hard and semantic matching for one resume and combines them.
pub async fn final_score(
    resume_skills: SkillSet,
    requirements: &JobRequirements,
    resume_text: &str,
    jd_text: &str,
    semantic: &SemanticMatcher,
) -> Result<FinalResult, AppError> {
    let hard = hard_match(resume_text, requirements);
    let soft_score = semantic.similarity(resume_text, jd_text).await?;
    Ok(combine(resume_skills, hard, soft_score))
}

/// Batch variant of `final_score`: the JD was encoded once by the caller.
pub async fn final_score_with_jd_embedding(
    resume_skills: SkillSet,
    requirements: &JobRequirements,
    resume_text: &str,
    jd_embedding: &Embedding,
    semantic: &SemanticMatcher,
) -> Result<FinalResult, AppError> {
    let hard = hard_match(resume_text, requirements);
    let soft_score = semantic.similarity_to(resume_text, jd_embedding).await?;
    Ok(combine(resume_skills, hard, soft_score))
}
