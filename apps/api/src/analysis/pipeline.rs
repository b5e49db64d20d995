//! Analysis pipeline: orchestrates a single resume / job description analysis.
//!
//! Flow: extract text → validate → extract skills (resume, job) → gap →
//!       similarity → {roadmap, feedback} → assemble.
//!
//! Steps run strictly in order except the two generative calls, which are
//! independent and joined before assembly. Nothing is retried.

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::advisor::feedback::recruiter_feedback;
use crate::advisor::roadmap::generate_roadmap;
use crate::analysis::models::{AnalysisResult, ResumeUpload};
use crate::document::{Document, TextExtractor};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::nlp::{analyze_gap, to_percentage, SimilarityScorer, SkillExtractor};

/// Extracted text shorter than this (after trimming) is logged with a preview.
const SHORT_TEXT_THRESHOLD: usize = 50;
const PREVIEW_CHARS: usize = 100;

/// Process-wide pipeline. Every collaborator is shared read-only across requests.
#[derive(Clone)]
pub struct AnalysisPipeline {
    text_extractor: Arc<dyn TextExtractor>,
    skill_extractor: SkillExtractor,
    scorer: SimilarityScorer,
    llm: Arc<dyn TextGenerator>,
}

impl AnalysisPipeline {
    pub fn new(
        text_extractor: Arc<dyn TextExtractor>,
        skill_extractor: SkillExtractor,
        scorer: SimilarityScorer,
        llm: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            text_extractor,
            skill_extractor,
            scorer,
            llm,
        }
    }

    /// Runs the full analysis for one uploaded resume.
    ///
    /// Steps:
    /// 1. text extraction → UnsupportedFormat / EmptyExtraction short-circuit
    /// 2. skill extraction for resume and job description
    /// 3. gap analysis
    /// 4. similarity score over the raw texts
    /// 5. roadmap (degrades to raw text when unparseable)
    /// 6. recruiter feedback
    /// 7. assemble
    pub async fn run(
        &self,
        upload: ResumeUpload,
        job_description: &str,
    ) -> Result<AnalysisResult, AppError> {
        let analysis_id = Uuid::new_v4();
        let span = info_span!("analysis", %analysis_id, filename = %upload.filename);
        self.run_steps(upload, job_description).instrument(span).await
    }

    async fn run_steps(
        &self,
        upload: ResumeUpload,
        job_description: &str,
    ) -> Result<AnalysisResult, AppError> {
        let ResumeUpload { filename, bytes } = upload;
        info!("File uploaded: {filename} ({} bytes)", bytes.len());

        // Step 1: Extract resume text
        let text_extractor = self.text_extractor.clone();
        let name = filename.clone();
        let resume_text =
            tokio::task::spawn_blocking(move || text_extractor.extract(&bytes, &name))
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Text extraction task failed: {e}")))??;

        let resume = Document::new(resume_text);
        debug!("Extracted text length: {}", resume.text().len());
        if resume.is_blank() {
            return Err(AppError::EmptyExtraction);
        }
        if resume.text().trim().chars().count() < SHORT_TEXT_THRESHOLD {
            let preview: String = resume.text().chars().take(PREVIEW_CHARS).collect();
            debug!("Extracted text preview: '{preview}...'");
        }
        let job = Document::new(job_description);

        // Steps 2–4: CPU-bound model inference and set algebra
        let skill_extractor = self.skill_extractor.clone();
        let scorer = self.scorer.clone();
        let (resume, job, skills_analysis, similarity) = tokio::task::spawn_blocking(move || {
            let resume_skills = skill_extractor.extract(&resume)?;
            let job_skills = skill_extractor.extract(&job)?;
            let gap = analyze_gap(&resume_skills, &job_skills);
            let similarity = scorer.score(&resume, &job)?;
            Ok::<_, AppError>((resume, job, gap, similarity))
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Skill analysis task failed: {e}")))??;

        let match_score = to_percentage(similarity);
        info!(
            "Match score {match_score}: {} matching, {} missing skills",
            skills_analysis.matching.len(),
            skills_analysis.missing.len()
        );

        // Steps 5–6: generative roadmap and feedback, issued together
        let missing: Vec<String> = skills_analysis.missing.iter().cloned().collect();
        let (roadmap, feedback) = tokio::join!(
            generate_roadmap(self.llm.as_ref(), resume.text(), job.text(), &missing),
            recruiter_feedback(self.llm.as_ref(), resume.text(), job.text()),
        );
        let roadmap =
            roadmap.map_err(|e| AppError::Llm(format!("Roadmap generation failed: {e}")))?;
        let feedback =
            feedback.map_err(|e| AppError::Llm(format!("Recruiter feedback failed: {e}")))?;

        // Step 7: Assemble
        Ok(AnalysisResult {
            filename,
            match_score,
            skills_analysis,
            roadmap,
            recruiter_feedback: feedback,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::advisor::roadmap::{RoadmapArtifact, ROADMAP_PARSE_ERROR};
    use crate::document::{ExtractError, FormatExtractor};
    use crate::llm_client::LlmError;
    use crate::nlp::skills::SkillSet;
    use crate::nlp::{
        DisabledRecognizer, Entity, EntityRecognizer, ModelError, SkillVocabulary, TextEmbedder,
    };

    pub(crate) const RESUME_TEXT: &str = "Experienced with Python, React, and PostgreSQL";
    pub(crate) const JOB_TEXT: &str = "Looking for a Python and Docker engineer";

    pub(crate) const ROADMAP_RESPONSE: &str = r#"```json
    {
        "thirty_day": {"learning_goals": ["Docker"], "project_focus": {"title": "Containerize", "description": "", "technologies": ["docker"]}, "expected_resume_bullets": []},
        "sixty_day": {"learning_goals": [], "project_focus": {"title": "Compose", "description": "", "technologies": []}, "expected_resume_bullets": []},
        "ninety_day": {"learning_goals": [], "project_focus": {"title": "Deploy", "description": "", "technologies": []}, "expected_resume_bullets": []},
        "project_ideas": [],
        "resume_suggestions": []
    }
    ```"#;

    /// Treats uploaded bytes as UTF-8 text regardless of extension.
    pub(crate) struct Utf8Extractor;

    impl TextExtractor for Utf8Extractor {
        fn extract(&self, bytes: &[u8], _filename: &str) -> Result<String, ExtractError> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    /// Bag-of-words embedder; counts calls.
    #[derive(Default)]
    pub(crate) struct CountingEmbedder {
        pub calls: AtomicUsize,
    }

    impl TextEmbedder for CountingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let lower = text.to_lowercase();
            Ok(["python", "docker", "react", "engineer"]
                .iter()
                .map(|w| lower.matches(w).count() as f32)
                .collect())
        }
    }

    #[derive(Default)]
    pub(crate) struct CountingRecognizer {
        pub calls: AtomicUsize,
    }

    impl EntityRecognizer for CountingRecognizer {
        fn recognize(&self, _text: &str) -> Result<Vec<Entity>, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct FailingEmbedder;

    impl TextEmbedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ModelError> {
            Err(ModelError::Config("model.safetensors not found".to_string()))
        }
    }

    /// Answers roadmap prompts and feedback prompts with canned text.
    pub(crate) struct ScriptedGenerator {
        pub roadmap: String,
        pub feedback: Result<String, u16>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(roadmap: &str) -> Self {
            Self {
                roadmap: roadmap.to_string(),
                feedback: Ok("## Feedback\n- Add Docker".to_string()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            if prompt.contains("roadmap") {
                Ok(self.roadmap.clone())
            } else {
                self.feedback.clone().map_err(|status| LlmError::Api {
                    status,
                    message: "quota exceeded".to_string(),
                })
            }
        }
    }

    fn pipeline_with(
        text_extractor: Arc<dyn TextExtractor>,
        recognizer: Arc<dyn EntityRecognizer>,
        embedder: Arc<dyn TextEmbedder>,
        llm: ScriptedGenerator,
    ) -> AnalysisPipeline {
        AnalysisPipeline::new(
            text_extractor,
            SkillExtractor::new(SkillVocabulary::default(), recognizer),
            SimilarityScorer::new(embedder),
            Arc::new(llm),
        )
    }

    fn upload(filename: &str, text: &str) -> ResumeUpload {
        ResumeUpload {
            filename: filename.to_string(),
            bytes: Bytes::from(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_python_docker_scenario() {
        let pipeline = pipeline_with(
            Arc::new(Utf8Extractor),
            Arc::new(DisabledRecognizer),
            Arc::new(CountingEmbedder::default()),
            ScriptedGenerator::new(ROADMAP_RESPONSE),
        );

        let result = pipeline
            .run(upload("resume.pdf", RESUME_TEXT), JOB_TEXT)
            .await
            .unwrap();

        assert_eq!(result.filename, "resume.pdf");
        let expected: SkillSet = ["python".to_string()].into_iter().collect();
        assert_eq!(result.skills_analysis.matching, expected);
        assert!(result.skills_analysis.missing.contains("docker"));
        assert!(!result.skills_analysis.missing.contains("python"));
        assert!(result.roadmap.is_plan());
        assert!(result.recruiter_feedback.starts_with("## Feedback"));
        assert!(result.match_score > 0.0 && result.match_score <= 100.0);
    }

    #[tokio::test]
    async fn test_unsupported_format_skips_analysis() {
        let recognizer = Arc::new(CountingRecognizer::default());
        let embedder = Arc::new(CountingEmbedder::default());
        let pipeline = pipeline_with(
            Arc::new(FormatExtractor),
            recognizer.clone(),
            embedder.clone(),
            ScriptedGenerator::new(ROADMAP_RESPONSE),
        );

        let err = pipeline
            .run(upload("resume.txt", RESUME_TEXT), JOB_TEXT)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFormat(_)));
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_whitespace_only_text_is_empty_extraction() {
        let embedder = Arc::new(CountingEmbedder::default());
        let pipeline = pipeline_with(
            Arc::new(Utf8Extractor),
            Arc::new(DisabledRecognizer),
            embedder.clone(),
            ScriptedGenerator::new(ROADMAP_RESPONSE),
        );

        let err = pipeline
            .run(upload("scan.pdf", " \n\t \n"), JOB_TEXT)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyExtraction));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_roadmap_degrades_without_failing() {
        let raw = "I'd suggest learning Docker first, then Kubernetes.";
        let pipeline = pipeline_with(
            Arc::new(Utf8Extractor),
            Arc::new(DisabledRecognizer),
            Arc::new(CountingEmbedder::default()),
            ScriptedGenerator::new(raw),
        );

        let result = pipeline
            .run(upload("resume.pdf", RESUME_TEXT), JOB_TEXT)
            .await
            .unwrap();

        assert_eq!(
            result.roadmap,
            RoadmapArtifact::Unparsed {
                error: ROADMAP_PARSE_ERROR.to_string(),
                raw: raw.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_feedback_failure_is_a_generic_failure() {
        let mut llm = ScriptedGenerator::new(ROADMAP_RESPONSE);
        llm.feedback = Err(429);
        let pipeline = pipeline_with(
            Arc::new(Utf8Extractor),
            Arc::new(DisabledRecognizer),
            Arc::new(CountingEmbedder::default()),
            llm,
        );

        let err = pipeline
            .run(upload("resume.pdf", RESUME_TEXT), JOB_TEXT)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(ref m) if m.contains("quota exceeded")));
    }

    #[tokio::test]
    async fn test_model_failure_is_a_generic_failure() {
        let pipeline = pipeline_with(
            Arc::new(Utf8Extractor),
            Arc::new(DisabledRecognizer),
            Arc::new(FailingEmbedder),
            ScriptedGenerator::new(ROADMAP_RESPONSE),
        );

        let err = pipeline
            .run(upload("resume.pdf", RESUME_TEXT), JOB_TEXT)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Model(_)));
    }

    #[tokio::test]
    async fn test_identical_texts_score_one_hundred() {
        let pipeline = pipeline_with(
            Arc::new(Utf8Extractor),
            Arc::new(DisabledRecognizer),
            Arc::new(CountingEmbedder::default()),
            ScriptedGenerator::new(ROADMAP_RESPONSE),
        );

        let result = pipeline
            .run(upload("resume.pdf", JOB_TEXT), JOB_TEXT)
            .await
            .unwrap();

        assert_eq!(result.match_score, 100.0);
        assert!(result.skills_analysis.missing.is_empty());
    }
}
