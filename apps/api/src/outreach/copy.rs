//! Copy stage — drafts subject lines, a primary email, and a follow-up.

use crate::llm_client::prompts::RETURN_JSON_ONLY;
use crate::llm_client::{GenerationPort, LlmError, TaskKind};
use crate::outreach::models::Tone;
use crate::outreach::prompts::{fill_template, COPY_PROMPT_TEMPLATE};
use crate::outreach::tone::tone_guideline;

/// Inputs to the copy stage. `research_json` is the validated research result,
/// already serialized.
#[derive(Debug, Clone, Copy)]
pub struct CopyBrief<'a> {
    pub company_name: &'a str,
    pub target_role: &'a str,
    pub product_description: &'a str,
    pub outreach_goal: &'a str,
    pub tone: Tone,
    pub research_json: &'a str,
}

pub fn build_copy_prompt(brief: &CopyBrief<'_>) -> String {
    fill_template(COPY_PROMPT_TEMPLATE, |name| match name {
        "return_json_only" => Some(RETURN_JSON_ONLY),
        "tone_guideline" => Some(tone_guideline(brief.tone)),
        "tone" => Some(brief.tone.as_str()),
        "company_name" => Some(brief.company_name),
        "target_role" => Some(brief.target_role),
        "product_description" => Some(brief.product_description),
        "outreach_goal" => Some(brief.outreach_goal),
        "research_json" => Some(brief.research_json),
        _ => None,
    })
}

pub async fn run_copy(
    port: &dyn GenerationPort,
    brief: &CopyBrief<'_>,
) -> Result<String, LlmError> {
    let prompt = build_copy_prompt(brief);
    port.generate(TaskKind::Copy, &prompt).await
}
