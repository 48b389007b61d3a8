// All LLM prompt constants for domain suggestions.

use crate::llm_client::prompts::{fill, JSON_ONLY_SYSTEM};

use super::suggester::MAX_SUGGESTIONS;

pub fn advisor_system() -> String {
    format!(
        "You are an expert career advisor specializing in internship placements. {JSON_ONLY_SYSTEM}"
    )
}

/// Replace `{background}`, `{interests}`, `{resume}` and `{max}` before sending.
const DOMAIN_PROMPT_TEMPLATE: &str = r#"Based on the following information about the applicant, suggest a list of relevant internship domains.

Background: {background}
Interests: {interests}
Resume: {resume}

Provide internship domains that would be a good fit for the applicant.
The list must contain no more than {max} items. Each item is a short domain
name such as "Data Analytics" or "Embedded Systems", not a sentence.

Return a JSON object with this EXACT schema (no extra fields):
{
  "suggestions": ["Domain name"]
}"#;

pub fn build_domain_prompt(background: &str, interests: &str, resume: &str) -> String {
    let prompt = fill(DOMAIN_PROMPT_TEMPLATE, "background", background);
    let prompt = fill(&prompt, "interests", interests);
    let prompt = fill(&prompt, "max", &MAX_SUGGESTIONS.to_string());
    // Last, so CV text containing a placeholder is left as written.
    fill(&prompt, "resume", resume)
}
