// CV-to-internship matching.
// Implements: upload orchestration, the external matching flow boundary,
// optional scoring, result filtering and table export.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod export;
pub mod filter;
pub mod flow;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod scoring;
