// All LLM prompt templates for the career advisor.
// Placeholders are filled by `fill_template` before sending.

/// Roadmap prompt. Replace `{jd_text}`, `{resume_text}`, `{missing_skills}`
/// and `{json_only}`.
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"You are a career coach and technical mentor.
A candidate wants to apply for a job with the following description:
---
{jd_text}
---
Their current resume content is:
---
{resume_text}
---
Based on the analysis, they are missing these key skills: {missing_skills}

Please generate a personalized 30/60/90-day learning and project roadmap to help them qualify for this role.

Format the response as a JSON object with exactly these keys:
- "thirty_day": An object with "learning_goals" (list), "project_focus" (object with "title", "description", "technologies"), and "expected_resume_bullets" (list).
- "sixty_day": Same structure as thirty_day.
- "ninety_day": Same structure as thirty_day.
- "project_ideas": A separate list of additional long-term project ideas.
- "resume_suggestions": A separate list of general ATS advice.

{json_only}"#;

/// Recruiter feedback prompt. Replace `{jd_text}`, `{resume_text}` and `{markdown}`.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Analyze this resume against the job description.
Job Description: {jd_text}
Resume: {resume_text}

Give honest, recruiter-style feedback on:
1. Why this resume might be rejected.
2. ATS keyword gaps.
3. Suggestions for bullet point improvements (use the X-Y-Z formula: Accomplished [X] as measured by [Y], by doing [Z]).

{markdown}"#;

/// Substitutes `{key}` placeholders in a single pass over `template`.
///
/// Inserted values are never rescanned, so placeholder-like text inside a
/// resume or job description reaches the model verbatim. Unknown `{...}`
/// sequences are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values.iter().find(|(key, _)| {
            tail.strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
