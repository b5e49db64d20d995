// Career advisor: generative roadmap and recruiter feedback.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod feedback;
pub mod prompts;
pub mod roadmap;
