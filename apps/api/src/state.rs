use std::sync::Arc;

use crate::config::Config;
use crate::jobs::JobStore;
use crate::llm_client::GenerationPort;
use crate::outreach::pipeline::{OutreachPipeline, StageRetryPolicy};
use crate::scrape::PageSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Page extractor. Production: `PageExtractor` over reqwest.
    pub pages: Arc<dyn PageSource>,
    /// Generation backend shared by all three stages. Production: `LlmClient`.
    pub llm: Arc<dyn GenerationPort>,
    pub jobs: Arc<dyn JobStore>,
}

impl AppState {
    /// A pipeline over the shared collaborators, with the configured retry policy.
    pub fn pipeline(&self) -> OutreachPipeline {
        let retry = StageRetryPolicy {
            max_attempts: self.config.stage_max_attempts,
            ..StageRetryPolicy::default()
        };
        OutreachPipeline::new(self.pages.clone(), self.llm.clone(), retry)
    }

    #[cfg(test)]
    pub fn for_tests(pages: Arc<dyn PageSource>, llm: Arc<dyn GenerationPort>) -> Self {
        use std::time::Duration;

        Self {
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                fetch_timeout: Duration::from_secs(15),
                page_text_max_chars: 10_000,
                llm_timeout: Duration::from_secs(120),
                stage_max_attempts: 1,
            },
            pages,
            llm,
            jobs: Arc::new(crate::jobs::InMemoryJobStore::new()),
        }
    }
}
