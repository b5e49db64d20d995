//! Skill gap: set algebra between resume and job skill sets.

use serde::{Deserialize, Serialize};

use crate::nlp::skills::{normalize_skill, SkillSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapResult {
    /// Skills on both the resume and the job description.
    pub matching: SkillSet,
    /// Skills the job description asks for that the resume lacks.
    pub missing: SkillSet,
}

/// `matching = resume ∩ job`, `missing = job − resume`, after normalization.
pub fn analyze_gap(resume_skills: &SkillSet, job_skills: &SkillSet) -> GapResult {
    let resume: SkillSet = resume_skills.iter().map(|s| normalize_skill(s)).collect();
    let job: SkillSet = job_skills.iter().map(|s| normalize_skill(s)).collect();

    GapResult {
        matching: resume.intersection(&job).cloned().collect(),
        missing: job.difference(&resume).cloned().collect(),
    }
}
