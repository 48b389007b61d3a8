// All LLM prompt constants for the matching flow.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{fill, GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};

/// System prompt for internship matching.
pub fn matcher_system() -> String {
    format!(
        "You are acting as a senior technical recruiter and hiring researcher. {JSON_ONLY_SYSTEM}"
    )
}

/// Matching prompt template. Replace `{resume}` before sending.
const MATCHER_PROMPT_TEMPLATE: &str = r#"Analyze the ATTACHED CV in depth.
{grounding}

OBJECTIVE:
Identify internship opportunities that are a strong, realistic match
for the candidate's current skills, projects, and experience level.

STRICT NON-NEGOTIABLE RULES:
1. Suggest ONLY real, legitimate companies.
2. Provide ONLY OFFICIAL COMPANY CAREER PAGE LINKS.
   - No Internshala, Unstop, LinkedIn Jobs, Indeed, Naukri or any job aggregator.
   - Links must belong to the company's own domain.
3. Do NOT fabricate roles, companies, or links.
4. If a specific internship is not currently listed, provide the official
   career page where such internships are usually posted.
5. Quality over quantity. Exclude companies that are not a strong CV match.

PRIORITY FILTERS:
- Entry-level / student-friendly internships
- Product-based companies or tech-driven startups
- Roles aligned strictly with the CV (no stretch roles)
- Remote or India-based roles preferred

FINAL VERIFICATION STEP (MANDATORY):
Before responding, recheck that every link is an official company domain,
that no third-party platforms are included, and that each company genuinely
aligns with the CV.

Return a JSON object with this EXACT schema (no extra fields):
{
  "results": [
    {
      "company": "Company name",
      "role": "Exact internship title or closest realistic role",
      "cvMatchReason": "1-2 lines referencing CV content",
      "skillsRequired": "Comma-separated required / preferred skills",
      "location": "Remote / India / Hybrid if known",
      "directCareerLink": "https://official-company-domain/careers/..."
    }
  ]
}
Return {"results": []} if nothing is a strong match.

CV TEXT:
{resume}"#;

pub fn build_matcher_prompt(resume: &str) -> String {
    let template = fill(MATCHER_PROMPT_TEMPLATE, "grounding", GROUNDING_INSTRUCTION);
    fill(&template, "resume", resume)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_resume_and_grounding() {
        let prompt = build_matcher_prompt("Built an ETL pipeline in Python");
        assert!(prompt.ends_with("CV TEXT:\nBuilt an ETL pipeline in Python"));
        assert!(prompt.contains("ONLY source of truth"));
        assert!(!prompt.contains("{resume}"));
        assert!(!prompt.contains("{grounding}"));
    }

    #[test]
    fn test_prompt_declares_wire_field_names() {
        let prompt = build_matcher_prompt("cv");
        for field in [
            "\"company\"",
            "\"role\"",
            "\"cvMatchReason\"",
            "\"skillsRequired\"",
            "\"location\"",
            "\"directCareerLink\"",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }
}
