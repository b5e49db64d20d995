//! Skill extraction: vocabulary scan plus named-entity fallback.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::document::Document;
use crate::nlp::vocabulary::SkillVocabulary;
use crate::nlp::{EntityRecognizer, ModelError};

/// Normalized (lowercase, trimmed) skill names. Sorted only for stable output.
pub type SkillSet = BTreeSet<String>;

pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

#[derive(Clone)]
pub struct SkillExtractor {
    vocabulary: Arc<SkillVocabulary>,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl SkillExtractor {
    pub fn new(vocabulary: SkillVocabulary, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            vocabulary: Arc::new(vocabulary),
            recognizer,
        }
    }

    /// Extracts the skill set of a document.
    ///
    /// Finding nothing yields an empty set. Errors only come from the
    /// entity recognizer failing to load or run.
    pub fn extract(&self, doc: &Document) -> Result<SkillSet, ModelError> {
        let mut skills = self.scan_vocabulary(doc);
        let from_vocabulary = skills.len();

        for entity in self.recognizer.recognize(doc.text())? {
            if !entity.kind.is_skill_candidate() {
                continue;
            }
            let skill = normalize_skill(&entity.text);
            if !skill.is_empty() {
                skills.insert(skill);
            }
        }

        debug!(
            "Extracted {} skills ({} from vocabulary)",
            skills.len(),
            from_vocabulary
        );
        Ok(skills)
    }

    /// Vocabulary terms whose pattern occurs anywhere in the lowercase text.
    pub fn scan_vocabulary(&self, doc: &Document) -> SkillSet {
        let haystack = doc.lowercase();
        self.vocabulary
            .terms()
            .iter()
            .filter(|term| haystack.contains(term.pattern.as_str()))
            .map(|term| term.name.clone())
            .collect()
    }
}
