//! Skill detection against a configurable vocabulary.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Seed vocabulary used when no vocabulary file is configured.
const SEED_SKILLS: &[&str] = &[
    "Python",
    "Java",
    "C++",
    "SQL",
    "R",
    "Tableau",
    "Power BI",
    "Machine Learning",
    "Deep Learning",
    "NLP",
    "React",
    "Node.js",
    "Excel",
    "Git",
    "Docker",
    "Kubernetes",
    "Pandas",
    "NumPy",
    "Matplotlib",
    "Scikit-learn",
    "TensorFlow",
    "PyTorch",
];

/// One vocabulary entry. Several entries may share a `name` to give a skill
/// more than one detection pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPattern {
    pub name: String,
    /// Literal needle, matched case-insensitively. Defaults to `name`.
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Canonical skill name to detection pattern, held lower-cased for matching.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    entries: Vec<(String, String)>,
}

impl SkillVocabulary {
    pub fn new(patterns: Vec<SkillPattern>) -> Result<Self> {
        let mut entries = Vec::with_capacity(patterns.len());
        for p in patterns {
            let name = p.name.trim().to_string();
            if name.is_empty() {
                bail!("skill vocabulary entry has an empty name");
            }
            let needle = p.pattern.as_deref().unwrap_or(name.as_str()).trim().to_lowercase();
            if needle.is_empty() {
                bail!("skill '{name}' has an empty pattern");
            }
            entries.push((name, needle));
        }
        Ok(Self { entries })
    }

    /// Reads a JSON array of `{ "name": ..., "pattern": ... }` objects.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary at {}", path.display()))?;
        let patterns: Vec<SkillPattern> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid skill vocabulary JSON in {}", path.display()))?;
        let vocabulary = Self::new(patterns)?;
        info!(
            "Loaded skill vocabulary from {} ({} patterns)",
            path.display(),
            vocabulary.len()
        );
        Ok(vocabulary)
    }

    /// The configured file if any, else the seed list.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_json_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self {
            entries: SEED_SKILLS
                .iter()
                .map(|s| (s.to_string(), s.to_lowercase()))
                .collect(),
        }
    }
}

/// Sorted, deduplicated set of canonical skill names found in a resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<String> for SkillSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        SkillSet(iter.into_iter().collect())
    }
}

/// Case-insensitive substring scan of `resume_text` for every vocabulary pattern.
pub fn detect_skills(resume_text: &str, vocabulary: &SkillVocabulary) -> SkillSet {
    let text_lower = resume_text.to_lowercase();
    vocabulary
        .entries
        .iter()
        .filter(|(_, needle)| text_lower.contains(needle.as_str()))
        .map(|(name, _)| name.clone())
        .collect()
}
