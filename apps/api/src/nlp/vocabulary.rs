//! Skill vocabulary: canonical skill names and the substring each one is matched by.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Built-in vocabulary covering common AI/ML and web development skills.
pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "javascript",
    "react",
    "node.js",
    "fastapi",
    "flask",
    "django",
    "tensorflow",
    "pytorch",
    "keras",
    "scikit-learn",
    "pandas",
    "numpy",
    "sql",
    "mongodb",
    "postgresql",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "machine learning",
    "deep learning",
    "nlp",
    "computer vision",
    "data science",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillTerm {
    /// Lowercase name reported in skill sets.
    pub name: String,
    /// Lowercase substring searched for in the document.
    pub pattern: String,
}

impl SkillTerm {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            pattern: pattern.trim().to_lowercase(),
        }
    }
}

/// Vocabulary file entry: either a bare skill name or `{ "name", "pattern" }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TermEntry {
    Name(String),
    Mapped {
        name: String,
        pattern: Option<String>,
    },
}

/// Immutable after construction; shared by every request.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    terms: Vec<SkillTerm>,
}

impl SkillVocabulary {
    /// Builds a vocabulary, dropping terms whose name or pattern is blank.
    pub fn new(terms: Vec<SkillTerm>) -> Self {
        let terms = terms
            .into_iter()
            .filter(|t| !t.name.is_empty() && !t.pattern.is_empty())
            .collect();
        Self { terms }
    }

    /// Parses a JSON array of skill names and/or `{ "name", "pattern" }` objects.
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<TermEntry> =
            serde_json::from_str(raw).context("Skill vocabulary must be a JSON array")?;
        let terms = entries
            .into_iter()
            .map(|entry| match entry {
                TermEntry::Name(name) => SkillTerm::new(&name, &name),
                TermEntry::Mapped { name, pattern } => {
                    let pattern = pattern.unwrap_or_else(|| name.clone());
                    SkillTerm::new(&name, &pattern)
                }
            })
            .collect();
        Ok(Self::new(terms))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid skill vocabulary {}", path.display()))
    }

    pub fn terms(&self) -> &[SkillTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(
            DEFAULT_SKILLS
                .iter()
                .map(|skill| SkillTerm::new(skill, skill))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_has_every_builtin_skill() {
        let vocabulary = SkillVocabulary::default();
        assert_eq!(vocabulary.len(), DEFAULT_SKILLS.len());
        assert!(vocabulary
            .terms()
            .iter()
            .all(|t| t.name == t.pattern && t.name == t.name.to_lowercase()));
    }

    #[test]
    fn test_from_json_accepts_names_and_mappings() {
        let vocabulary = SkillVocabulary::from_json(
            r#"["Rust", {"name": "Go", "pattern": "golang"}, {"name": "Kafka"}]"#,
        )
        .unwrap();

        assert_eq!(
            vocabulary.terms(),
            &[
                SkillTerm::new("rust", "rust"),
                SkillTerm::new("go", "golang"),
                SkillTerm::new("kafka", "kafka"),
            ]
        );
    }

    #[test]
    fn test_blank_terms_are_dropped() {
        let vocabulary = SkillVocabulary::from_json(r#"["  ", {"name": "sql", "pattern": ""}]"#).unwrap();
        assert_eq!(vocabulary.len(), 0);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(SkillVocabulary::from_json(r#"{"python": "python"}"#).is_err());
    }
}
