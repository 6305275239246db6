//! Hard matching: literal presence of each requirement line in the resume.
//!
//! The whole requirement line must appear in the resume as a case-insensitive
//! substring. No tokenization: "Must have: SQL" is only matched by text that
//! contains "must have: sql".

use serde::{Deserialize, Serialize};

use crate::matching::jd_parser::JobRequirements;
use crate::matching::round2;

pub const MUST_HAVE_WEIGHT: f64 = 5.0;
pub const GOOD_TO_HAVE_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardMatchResult {
    /// 0 – 100, two decimals.
    pub score: f64,
    pub must_matched: Vec<String>,
    pub good_matched: Vec<String>,
    pub missing_must: Vec<String>,
    pub missing_good: Vec<String>,
}

pub fn hard_match(resume_text: &str, requirements: &JobRequirements) -> HardMatchResult {
    let resume_lower = resume_text.to_lowercase();

    let (must_matched, missing_must) = partition_present(&requirements.must_have, &resume_lower);
    let (good_matched, missing_good) = partition_present(&requirements.good_to_have, &resume_lower);

    let earned = must_matched.len() as f64 * MUST_HAVE_WEIGHT
        + good_matched.len() as f64 * GOOD_TO_HAVE_WEIGHT;
    let possible = requirements.must_have.len() as f64 * MUST_HAVE_WEIGHT
        + requirements.good_to_have.len() as f64 * GOOD_TO_HAVE_WEIGHT;

    HardMatchResult {
        score: round2(earned / possible.max(1.0) * 100.0),
        must_matched,
        good_matched,
        missing_must,
        missing_good,
    }
}

/// Splits requirement lines into (present, absent), keeping their original order.
fn partition_present(requirements: &[String], resume_lower: &str) -> (Vec<String>, Vec<String>) {
    requirements
        .iter()
        .cloned()
        .partition(|req| resume_lower.contains(&req.to_lowercase()))
}
