//! Markdown evaluation report for one candidate.

use std::fmt::Write;

use crate::matching::scoring::FinalResult;

pub struct ReportInput<'a> {
    pub candidate_name: &'a str,
    pub resume_file: &'a str,
    pub jd_file: &'a str,
    pub result: &'a FinalResult,
    pub feedback: &'a str,
}

pub fn render_report(input: &ReportInput<'_>) -> String {
    let ReportInput {
        candidate_name,
        resume_file,
        jd_file,
        result,
        feedback,
    } = input;

    let matched = join_or_none(&result.resume_skills.to_vec());
    let missing = join_or_none(&result.missing_requirements());

    let mut out = String::new();
    // writeln! into a String cannot fail
    let _ = writeln!(out, "# Resume Evaluation Report\n");
    let _ = writeln!(out, "- **Candidate:** {candidate_name}");
    let _ = writeln!(out, "- **Resume File:** {resume_file}");
    let _ = writeln!(out, "- **Job Description File:** {jd_file}\n");

    let _ = writeln!(out, "## Scores\n");
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "| --- | --- |");
    let _ = writeln!(out, "| Final Score | {}% |", result.final_score);
    let _ = writeln!(out, "| Hard Match | {}% |", result.hard_score);
    let _ = writeln!(out, "| Semantic Match | {}% |", result.soft_score);
    let _ = writeln!(out, "| Verdict | {} |\n", result.verdict);

    let _ = writeln!(out, "## Matched Skills\n\n{matched}\n");
    let _ = writeln!(out, "## Missing Skills\n\n{missing}\n");

    let _ = writeln!(out, "## Suggestions for Improvement\n");
    for line in feedback.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "- {line}");
    }

    out
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::Verdict;
    use crate::matching::skills::SkillSet;

    fn result(skills: &[&str], missing_must: &[&str]) -> FinalResult {
        FinalResult {
            resume_skills: skills.iter().map(|s| s.to_string()).collect(),
            hard_score: 71.43,
            soft_score: 62.5,
            final_score: 66.97,
            verdict: Verdict::Medium,
            missing_must: missing_must.iter().map(|s| s.to_string()).collect(),
            missing_good: vec![],
        }
    }

    #[test]
    fn test_report_sections_and_scores() {
        let result = result(&["SQL", "Python"], &["- Airflow"]);
        let report = render_report(&ReportInput {
            candidate_name: "Jane Doe",
            resume_file: "jane.pdf",
            jd_file: "de.txt",
            result: &result,
            feedback: "⚡ Add or highlight these skills/projects in your resume: - Airflow\n📌 Include measurable results.",
        });

        assert!(report.starts_with("# Resume Evaluation Report\n"));
        assert!(report.contains("- **Candidate:** Jane Doe"));
        assert!(report.contains("- **Job Description File:** de.txt"));
        assert!(report.contains("| Final Score | 66.97% |"));
        assert!(report.contains("| Semantic Match | 62.5% |"));
        assert!(report.contains("| Verdict | Medium |"));
        // skills are reported in sorted order
        assert!(report.contains("## Matched Skills\n\nPython, SQL\n"));
        assert!(report.contains("## Missing Skills\n\n- Airflow\n"));
        assert!(report.ends_with("- 📌 Include measurable results.\n"));
    }

    #[test]
    fn test_report_empty_lists_say_none() {
        let mut result = result(&[], &[]);
        result.resume_skills = SkillSet::default();
        let report = render_report(&ReportInput {
            candidate_name: "x",
            resume_file: "x.txt",
            jd_file: "jd.txt",
            result: &result,
            feedback: "",
        });

        assert!(report.contains("## Matched Skills\n\nNone\n"));
        assert!(report.contains("## Missing Skills\n\nNone\n"));
        assert!(report.ends_with("## Suggestions for Improvement\n\n"));
    }
}
