//! Research stage — turns scraped page text into facts usable for personalization.

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, RETURN_JSON_ONLY};
use crate::llm_client::{GenerationPort, LlmError, TaskKind};
use crate::outreach::prompts::{fill_template, RESEARCH_PROMPT_TEMPLATE};
use crate::scrape::PageText;

pub fn build_research_prompt(
    company_name: &str,
    page_text: &PageText,
    target_role: &str,
) -> String {
    fill_template(RESEARCH_PROMPT_TEMPLATE, |name| match name {
        "grounding_instruction" => Some(GROUNDING_INSTRUCTION),
        "return_json_only" => Some(RETURN_JSON_ONLY),
        "company_name" => Some(company_name),
        "target_role" => Some(target_role),
        "page_text" => Some(page_text.as_str()),
        _ => None,
    })
}

/// Returns the backend's raw text; parsing belongs to the orchestrator.
pub async fn run_research(
    port: &dyn GenerationPort,
    company_name: &str,
    page_text: &PageText,
    target_role: &str,
) -> Result<String, LlmError> {
    let prompt = build_research_prompt(company_name, page_text, target_role);
    port.generate(TaskKind::Research, &prompt).await
}
