//! Roadmap: 30/60/90-day learning plan generated from the skill gap.
//!
//! The generative response is sanitized (code fences stripped) and parsed into
//! `Roadmap`. Output that does not fit the schema degrades to
//! `RoadmapArtifact::Unparsed` carrying the raw text; it never fails the request.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::advisor::prompts::{fill_template, ROADMAP_PROMPT_TEMPLATE};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{strip_code_fences, LlmError, TextGenerator};

pub const ROADMAP_PARSE_ERROR: &str = "Failed to parse roadmap";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFocus {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// One time horizon of the roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    #[serde(default)]
    pub learning_goals: Vec<String>,
    pub project_focus: ProjectFocus,
    #[serde(default)]
    pub expected_resume_bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub thirty_day: RoadmapPhase,
    pub sixty_day: RoadmapPhase,
    pub ninety_day: RoadmapPhase,
    #[serde(default)]
    pub project_ideas: Vec<String>,
    #[serde(default)]
    pub resume_suggestions: Vec<String>,
}

/// Serialized either as the roadmap itself or as `{"error", "raw"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoadmapArtifact {
    Plan(Box<Roadmap>),
    Unparsed { error: String, raw: String },
}

impl RoadmapArtifact {
    #[cfg(test)]
    pub fn is_plan(&self) -> bool {
        matches!(self, RoadmapArtifact::Plan(_))
    }
}

/// Parses a generative response into a roadmap, falling back to the raw text.
pub fn parse_roadmap(raw: &str) -> RoadmapArtifact {
    match serde_json::from_str::<Roadmap>(strip_code_fences(raw)) {
        Ok(roadmap) => RoadmapArtifact::Plan(Box::new(roadmap)),
        Err(e) => {
            warn!("Roadmap response did not match the expected schema: {e}");
            RoadmapArtifact::Unparsed {
                error: ROADMAP_PARSE_ERROR.to_string(),
                raw: raw.to_string(),
            }
        }
    }
}

pub fn build_roadmap_prompt(resume_text: &str, jd_text: &str, missing_skills: &[String]) -> String {
    let missing_skills = missing_skills.join(", ");
    fill_template(
        ROADMAP_PROMPT_TEMPLATE,
        &[
            ("jd_text", jd_text),
            ("resume_text", resume_text),
            ("missing_skills", &missing_skills),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

/// Requests a roadmap for the missing skills. Only transport failures are errors.
pub async fn generate_roadmap(
    llm: &dyn TextGenerator,
    resume_text: &str,
    jd_text: &str,
    missing_skills: &[String],
) -> Result<RoadmapArtifact, LlmError> {
    let prompt = build_roadmap_prompt(resume_text, jd_text, missing_skills);
    let raw = llm.generate(&prompt).await?;
    Ok(parse_roadmap(&raw))
}
