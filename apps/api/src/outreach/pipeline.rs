//! Outreach pipeline — sequences page extraction and the three stages.
//!
//! Flow: fetch_and_extract → research → parse + validate → copy → parse +
//!       validate → qa → parse + validate → assemble OutreachResult.
//!
//! Strictly linear. Any failure aborts the run; nothing partial is returned.
//! Each stage reads only the validated output of the stage before it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::{GenerationPort, LlmError, TaskKind};
use crate::outreach::copy::{run_copy, CopyBrief};
use crate::outreach::json_extract::extract_json_object;
use crate::outreach::models::{
    CopyResult, OutreachRequest, OutreachResult, QaResult, ResearchResult,
};
use crate::outreach::qa::run_qa;
use crate::outreach::research::run_research;
use crate::outreach::validation::{validate_stage_output, StageOutput};
use crate::scrape::PageSource;

/// How often a single stage's generation call may be attempted.
///
/// Only transient backend failures are retried, and only for the stage that
/// failed; validated results of earlier stages are kept. `max_attempts == 1`
/// means no retries.
#[derive(Debug, Clone, Copy)]
pub struct StageRetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for StageRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl StageRetryPolicy {
    /// Backoff before attempt `attempt` (1-based retries): base, 2x base, 4x base...
    fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << (attempt - 1).min(16))
    }
}

/// One pipeline run's collaborators. Cheap to build per request.
pub struct OutreachPipeline {
    pages: Arc<dyn PageSource>,
    port: Arc<dyn GenerationPort>,
    retry: StageRetryPolicy,
}

impl OutreachPipeline {
    pub fn new(
        pages: Arc<dyn PageSource>,
        port: Arc<dyn GenerationPort>,
        retry: StageRetryPolicy,
    ) -> Self {
        Self { pages, port, retry }
    }

    /// Runs the full pipeline for one request.
    ///
    /// Steps:
    /// 1. fetch_and_extract() → PageText
    /// 2. research stage → ResearchResult
    /// 3. copy stage (with serialized ResearchResult) → CopyResult
    /// 4. qa stage (with serialized CopyResult) → QaResult
    /// 5. assemble OutreachResult
    pub async fn run(&self, request: &OutreachRequest) -> Result<OutreachResult, AppError> {
        let port = self.port.as_ref();

        // Step 1: Page text
        let page_text = self
            .pages
            .fetch_and_extract(&request.company_website)
            .await?;
        info!(
            "Extracted {} chars for {}",
            page_text.char_len(),
            request.company_name
        );

        // Step 2: Research
        let company_name = request.company_name.as_str();
        let target_role = request.target_role.as_str();
        let page_text = &page_text;
        let raw = self
            .generate_with_retry(TaskKind::Research, move || {
                run_research(port, company_name, page_text, target_role)
            })
            .await?;
        let research: ResearchResult = parse_stage_output(&raw)?;
        info!(
            "Research complete: industry={:?}, {} hooks",
            research.industry,
            research.personalization_hooks.len()
        );

        // Step 3: Copy
        let research_json = to_prompt_json(&research)?;
        let brief = CopyBrief {
            company_name,
            target_role,
            product_description: &request.product_description,
            outreach_goal: &request.outreach_goal,
            tone: request.tone,
            research_json: &research_json,
        };
        let brief = &brief;
        let raw = self
            .generate_with_retry(TaskKind::Copy, move || run_copy(port, brief))
            .await?;
        let copy: CopyResult = parse_stage_output(&raw)?;
        info!("Copy complete: {} subject lines", copy.subject_lines.len());

        // Step 4: QA
        let copy_json = to_prompt_json(&copy)?;
        let copy_json = copy_json.as_str();
        let raw = self
            .generate_with_retry(TaskKind::Qa, move || run_qa(port, copy_json))
            .await?;
        let qa: QaResult = parse_stage_output(&raw)?;
        info!(
            "QA complete: spam_risk_score={:?}, {} risk factors",
            qa.spam_risk_score,
            qa.risk_factors.len()
        );
        if !qa.analysis_notes.is_empty() {
            debug!("QA notes: {}", qa.analysis_notes);
        }

        // Step 5: Assemble
        Ok(OutreachResult::assemble(research, copy, qa))
    }

    /// Invokes one stage's generation call, retrying transient backend
    /// failures per `self.retry`.
    async fn generate_with_retry<F, Fut>(
        &self,
        task: TaskKind,
        invoke: F,
    ) -> Result<String, AppError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<String, LlmError>>,
    {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.retry.delay_before(attempt);
                tokio::time::sleep(delay).await;
            }
            attempt += 1;

            match invoke().await {
                Ok(raw) => {
                    debug!("{task} stage returned {} chars", raw.len());
                    return Ok(raw);
                }
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(
                        "{task} stage attempt {}/{} failed, retrying: {e}",
                        attempt, self.retry.max_attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Extract + validate, the same way for every stage.
fn parse_stage_output<T: StageOutput>(raw: &str) -> Result<T, AppError> {
    let value = extract_json_object(raw, T::STAGE)?;
    Ok(validate_stage_output(value)?)
}

fn to_prompt_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize stage output: {e}")))
}
