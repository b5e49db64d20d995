//! Recruiter-style feedback: rejection risks, ATS keyword gaps, bullet rewrites.

use crate::advisor::prompts::{fill_template, FEEDBACK_PROMPT_TEMPLATE};
use crate::llm_client::prompts::MARKDOWN_INSTRUCTION;
use crate::llm_client::{LlmError, TextGenerator};

pub fn build_feedback_prompt(resume_text: &str, jd_text: &str) -> String {
    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("jd_text", jd_text),
            ("resume_text", resume_text),
            ("markdown", MARKDOWN_INSTRUCTION),
        ],
    )
}

/// Returns the generated Markdown feedback unchanged.
pub async fn recruiter_feedback(
    llm: &dyn TextGenerator,
    resume_text: &str,
    jd_text: &str,
) -> Result<String, LlmError> {
    llm.generate(&build_feedback_prompt(resume_text, jd_text)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            Ok(prompt.to_string())
        }
    }

    #[test]
    fn test_prompt_mentions_xyz_formula_and_markdown() {
        let prompt = build_feedback_prompt("My resume", "The job");
        assert!(prompt.contains("Resume: My resume"));
        assert!(prompt.contains("Job Description: The job"));
        assert!(prompt.contains("X-Y-Z formula"));
        assert!(prompt.ends_with(MARKDOWN_INSTRUCTION));
    }

    #[test]
    fn test_prompt_keeps_placeholder_text_from_job_description() {
        let prompt = build_feedback_prompt("RESUME_BODY", "Paste {resume_text} and {markdown} here");
        assert!(prompt.contains("Job Description: Paste {resume_text} and {markdown} here"));
        assert_eq!(prompt.matches("RESUME_BODY").count(), 1);
        assert_eq!(prompt.matches(MARKDOWN_INSTRUCTION).count(), 1);
    }

    #[tokio::test]
    async fn test_feedback_returns_generator_output() {
        let feedback = recruiter_feedback(&EchoGenerator, "resume body", "job body")
            .await
            .unwrap();
        assert!(feedback.contains("resume body"));
        assert!(feedback.contains("job body"));
    }
}
