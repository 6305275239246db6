//! Improvement suggestions derived from the requirements a resume missed.

use crate::matching::jd_parser::JobRequirements;
use crate::matching::scoring::FinalResult;

/// How many missing requirements are named in the first suggestion.
const MAX_NAMED_MISSING: usize = 8;

/// Leads the missing-requirements line.
const MISSING_MARKER: &str = "⚡";

const GENERIC_SUGGESTIONS: [&str; 4] = [
    "📌 Include measurable results in projects (e.g., 'improved accuracy by 10%').",
    "📌 Move Technical Skills section to the top for better visibility.",
    "📌 Add certifications or online courses for missing skills if possible.",
    "📌 Include links to GitHub/portfolio to showcase hands-on projects.",
];

/// Ordered suggestion list: a missing-requirements line when anything is
/// missing, then the four generic suggestions.
///
/// `_requirements` is accepted so role-aware phrasing can be added without
/// changing callers; today the content depends only on the match result.
pub fn feedback_suggestions(_requirements: &JobRequirements, result: &FinalResult) -> Vec<String> {
    let missing = result.missing_requirements();

    let mut suggestions = Vec::with_capacity(GENERIC_SUGGESTIONS.len() + 1);
    if !missing.is_empty() {
        let named: Vec<&str> = missing
            .iter()
            .take(MAX_NAMED_MISSING)
            .map(String::as_str)
            .collect();
        suggestions.push(format!(
            "{MISSING_MARKER} Add or highlight these skills/projects in your resume: {}",
            named.join(", ")
        ));
    }
    suggestions.extend(GENERIC_SUGGESTIONS.iter().map(|s| s.to_string()));
    suggestions
}

/// Newline-joined `feedback_suggestions`.
pub fn generate_feedback(requirements: &JobRequirements, result: &FinalResult) -> String {
    feedback_suggestions(requirements, result).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::Verdict;
    use crate::matching::skills::SkillSet;

    fn requirements() -> JobRequirements {
        JobRequirements {
            role_title: "Data Scientist".to_string(),
            must_have: vec![],
            good_to_have: vec![],
            raw_text: String::new(),
        }
    }

    fn result(missing_must: &[&str], missing_good: &[&str]) -> FinalResult {
        FinalResult {
            resume_skills: SkillSet::default(),
            hard_score: 0.0,
            soft_score: 0.0,
            final_score: 0.0,
            verdict: Verdict::Low,
            missing_must: missing_must.iter().map(|s| s.to_string()).collect(),
            missing_good: missing_good.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_nothing_missing_gives_only_generic_suggestions() {
        let suggestions = feedback_suggestions(&requirements(), &result(&[], &[]));
        assert_eq!(suggestions.len(), 4);
        assert_eq!(suggestions, GENERIC_SUGGESTIONS.map(String::from).to_vec());
    }

    #[test]
    fn test_missing_items_listed_first_must_before_good() {
        let suggestions =
            feedback_suggestions(&requirements(), &result(&["- SQL", "- Python"], &["Preferred: Spark"]));
        assert_eq!(suggestions.len(), 5);
        assert_eq!(
            suggestions[0],
            "⚡ Add or highlight these skills/projects in your resume: - SQL, - Python, Preferred: Spark"
        );
        assert_eq!(suggestions[1], GENERIC_SUGGESTIONS[0]);
        assert_eq!(suggestions[4], GENERIC_SUGGESTIONS[3]);
    }

    #[test]
    fn test_names_at_most_eight_missing_items() {
        let must: Vec<String> = (1..=6).map(|i| format!("m{i}")).collect();
        let good: Vec<String> = (1..=5).map(|i| format!("g{i}")).collect();
        let must_refs: Vec<&str> = must.iter().map(String::as_str).collect();
        let good_refs: Vec<&str> = good.iter().map(String::as_str).collect();

        let suggestions = feedback_suggestions(&requirements(), &result(&must_refs, &good_refs));
        assert_eq!(
            suggestions[0],
            "⚡ Add or highlight these skills/projects in your resume: m1, m2, m3, m4, m5, m6, g1, g2"
        );
    }

    #[test]
    fn test_generate_feedback_is_newline_joined() {
        let feedback = generate_feedback(&requirements(), &result(&["- Kafka"], &[]));
        let lines: Vec<&str> = feedback.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with("- Kafka"));
        assert!(lines[4].contains("portfolio"));
    }

    #[test]
    fn test_suggestions_carry_markers() {
        let suggestions = feedback_suggestions(&requirements(), &result(&["- Docker"], &[]));
        assert!(suggestions[0].starts_with("⚡ "));
        assert!(suggestions[1..].iter().all(|s| s.starts_with("📌 ")));
    }
}
