// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to prompts whose response is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Do not include markdown code blocks in your response, just the raw JSON.";

/// Appended to prompts whose response is shown to the user as-is.
pub const MARKDOWN_INSTRUCTION: &str = "Format the response in Markdown.";
