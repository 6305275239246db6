//! JD Parser: turns normalized job-description text into a `JobRequirements` set.
//!
//! This is a cheap line classifier, not a language parser. Downstream scoring
//! only checks phrase presence, so the exact wording of each line is what
//! matters and lines are stored verbatim.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const UNKNOWN_ROLE: &str = "Unknown Role";

const MUST_MARKERS: &[&str] = &["must", "requirement", "who you are"];
const GOOD_MARKERS: &[&str] = &["good", "nice to have", "preferred"];
const BULLET_GLYPHS: &[&str] = &["●", "-"];

/// Structured requirements extracted from a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub role_title: String,
    pub must_have: Vec<String>,
    pub good_to_have: Vec<String>,
    pub raw_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineClass {
    MustHave,
    GoodToHave,
    Discarded,
}

/// Parses a job description into role title and must-have / good-to-have lines.
///
/// `source_path` is only inspected for its extension, which is logged; the
/// classification never depends on it.
pub fn parse_jd(jd_text: &str, source_path: Option<&Path>) -> JobRequirements {
    let extension = source_extension(source_path);

    let lines: Vec<&str> = jd_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let role_title = lines
        .first()
        .map(|line| line.to_string())
        .unwrap_or_else(|| UNKNOWN_ROLE.to_string());

    let mut must_have = Vec::new();
    let mut good_to_have = Vec::new();

    for line in &lines {
        match classify_line(line) {
            LineClass::MustHave => must_have.push(line.to_string()),
            LineClass::GoodToHave => good_to_have.push(line.to_string()),
            LineClass::Discarded => {}
        }
    }

    debug!(
        role_title = %role_title,
        extension = %extension,
        must_have = must_have.len(),
        good_to_have = good_to_have.len(),
        "Parsed job description"
    );

    JobRequirements {
        role_title,
        must_have,
        good_to_have,
        raw_text: jd_text.to_string(),
    }
}

/// Lower-cased extension of the source file, or empty when there is none.
fn source_extension(source_path: Option<&Path>) -> String {
    source_path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// First matching rule wins: keyword "must" markers, then "good" markers,
/// then bullet / numbered-list shape.
fn classify_line(line: &str) -> LineClass {
    let lower = line.to_lowercase();

    if MUST_MARKERS.iter().any(|m| lower.contains(m)) {
        LineClass::MustHave
    } else if GOOD_MARKERS.iter().any(|m| lower.contains(m)) {
        LineClass::GoodToHave
    } else if BULLET_GLYPHS.iter().any(|g| line.starts_with(g)) || starts_with_list_number(line) {
        LineClass::MustHave
    } else {
        LineClass::Discarded
    }
}

/// Matches `^\d+\.`
fn starts_with_list_number(line: &str) -> bool {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_ANALYST_JD: &str = "Data Analyst — Growth Team\n\
        About us: we are a fintech scaling across India.\n\
        Requirements: Python, SQL and Excel\n\
        ● Build dashboards in Power BI\n\
        - Work with stakeholders\n\
        2. Own weekly reporting\n\
        Good to have: Tableau\n\
        Preferred: exposure to Machine Learning\n\
        Who you are: curious and detail-oriented\n\
        We offer flexible hours.";

    #[test]
    fn test_role_title_is_first_non_empty_line() {
        let parsed = parse_jd("\n\n  Senior Data Scientist  \nMust know Python", None);
        assert_eq!(parsed.role_title, "Senior Data Scientist");
    }

    #[test]
    fn test_role_title_keeps_original_case() {
        let parsed = parse_jd("ML ENGINEER", None);
        assert_eq!(parsed.role_title, "ML ENGINEER");
    }

    #[test]
    fn test_empty_text_yields_unknown_role() {
        let parsed = parse_jd("", None);
        assert_eq!(parsed.role_title, UNKNOWN_ROLE);
        assert!(parsed.must_have.is_empty());
        assert!(parsed.good_to_have.is_empty());
        assert_eq!(parsed.raw_text, "");
    }

    #[test]
    fn test_classifies_realistic_jd() {
        let parsed = parse_jd(DATA_ANALYST_JD, None);
        assert_eq!(
            parsed.must_have,
            vec![
                "Requirements: Python, SQL and Excel",
                "● Build dashboards in Power BI",
                "- Work with stakeholders",
                "2. Own weekly reporting",
                "Who you are: curious and detail-oriented",
            ]
        );
        assert_eq!(
            parsed.good_to_have,
            vec!["Good to have: Tableau", "Preferred: exposure to Machine Learning"]
        );
        assert_eq!(parsed.raw_text, DATA_ANALYST_JD);
    }

    #[test]
    fn test_unmarked_prose_is_discarded() {
        let parsed = parse_jd("Title\nWe offer flexible hours.", None);
        assert!(parsed.must_have.is_empty());
        assert!(parsed.good_to_have.is_empty());
    }

    #[test]
    fn test_must_takes_precedence_over_good() {
        let parsed = parse_jd("Must have good communication", None);
        assert_eq!(parsed.must_have, vec!["Must have good communication"]);
        assert!(parsed.good_to_have.is_empty());
    }

    #[test]
    fn test_keyword_lines_beat_bullet_shape() {
        let parsed = parse_jd("- nice to have: Docker", None);
        assert_eq!(parsed.good_to_have, vec!["- nice to have: Docker"]);
        assert!(parsed.must_have.is_empty());
    }

    #[test]
    fn test_title_line_is_also_classified() {
        let parsed = parse_jd("Must have: SQL", None);
        assert_eq!(parsed.role_title, "Must have: SQL");
        assert_eq!(parsed.must_have, vec!["Must have: SQL"]);
        assert!(parsed.good_to_have.is_empty());
    }

    #[test]
    fn test_numbered_list_requires_dot() {
        assert!(starts_with_list_number("12. Kubernetes"));
        assert!(!starts_with_list_number("12 Kubernetes"));
        assert!(!starts_with_list_number(". Kubernetes"));
        assert!(!starts_with_list_number("2024 roadmap"));
    }

    #[test]
    fn test_source_path_does_not_change_parsing() {
        let with_pdf = parse_jd(DATA_ANALYST_JD, Some(Path::new("jd.PDF")));
        let with_txt = parse_jd(DATA_ANALYST_JD, Some(Path::new("jd.txt")));
        let without = parse_jd(DATA_ANALYST_JD, None);
        assert_eq!(with_pdf, without);
        assert_eq!(with_txt, without);
        assert_eq!(source_extension(Some(Path::new("jd.PDF"))), "pdf");
        assert_eq!(source_extension(None), "");
    }

    #[test]
    fn test_requirements_serialize_with_snake_case_fields() {
        let parsed = parse_jd("Must have: SQL", None);
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["role_title"], "Must have: SQL");
        assert_eq!(json["must_have"][0], "Must have: SQL");
        assert!(json["good_to_have"].as_array().unwrap().is_empty());
    }
}
