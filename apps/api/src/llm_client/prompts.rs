// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to every CV-grounded prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: The CV is the ONLY source of truth. \
    Do NOT infer, assume, or add any skills, tools, experience, or interests \
    that are not explicitly mentioned in the CV.";

/// Substitutes `{placeholder}` in `template` with `value`.
pub fn fill(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(&format!("{{{placeholder}}}"), value)
}
