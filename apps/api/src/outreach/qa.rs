//! QA stage — scores the drafted emails for spam risk without rewriting them.

use crate::llm_client::prompts::RETURN_JSON_ONLY;
use crate::llm_client::{GenerationPort, LlmError, TaskKind};
use crate::outreach::prompts::{fill_template, QA_PROMPT_TEMPLATE};

pub fn build_qa_prompt(copy_json: &str) -> String {
    fill_template(QA_PROMPT_TEMPLATE, |name| match name {
        "return_json_only" => Some(RETURN_JSON_ONLY),
        "copy_json" => Some(copy_json),
        _ => None,
    })
}

pub async fn run_qa(port: &dyn GenerationPort, copy_json: &str) -> Result<String, LlmError> {
    let prompt = build_qa_prompt(copy_json);
    port.generate(TaskKind::Qa, &prompt).await
}
