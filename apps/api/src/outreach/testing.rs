//! Scripted collaborators for pipeline and handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::llm_client::{GenerationPort, LlmError, TaskKind};
use crate::scrape::{FetchError, PageSource, PageText};

pub const ACME_PAGE: &str = "Acme Corp builds developer tooling. \
    Acme Corp recently launched a developer API. Trusted by 4,000 engineering teams.";

pub const RESEARCH_OUTPUT: &str = r#"Here is what I found:
```json
{
    "industry": "Developer tools",
    "value_proposition": "APIs that let engineering teams ship integrations faster",
    "personalization_hooks": [
        "Recently launched a developer API",
        "Trusted by 4,000 engineering teams"
    ],
    "company_summary": "Acme Corp builds developer tooling. It recently launched a developer API."
}
```"#;

pub const COPY_OUTPUT: &str = r#"{
    "subject_lines": [
        "Acme's new developer API",
        "Review times for 4,000 teams",
        "A question for Acme engineering"
    ],
    "primary_email": "Saw that Acme recently launched a developer API. Teams shipping public APIs often find code review becomes the bottleneck. Our reviewer halves PR turnaround. Open to a 15-minute demo next week?",
    "follow_up_email": "Following my note about the API launch, one more angle: faster reviews mean faster API versioning. Would a short demo be useful?"
}"#;

pub const QA_OUTPUT: &str = r#"Analysis complete. {"spam_risk_score": "low", "risk_factors": [], "analysis_notes": "Specific, no hype."}"#;

/// Returns a canned response per task and records every call.
pub struct ScriptedPort {
    responses: HashMap<TaskKind, Result<String, ScriptedFailure>>,
    calls: Mutex<Vec<(TaskKind, String)>>,
    /// Transient failures to emit per task before the scripted response.
    flaky: Mutex<HashMap<TaskKind, u32>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ScriptedFailure {
    Configuration,
    Provider,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            flaky: Mutex::new(HashMap::new()),
        }
    }

    /// Research, copy and QA all answer with valid (decorated) JSON.
    pub fn happy_path() -> Self {
        Self::new()
            .respond(TaskKind::Research, RESEARCH_OUTPUT)
            .respond(TaskKind::Copy, COPY_OUTPUT)
            .respond(TaskKind::Qa, QA_OUTPUT)
    }

    pub fn respond(mut self, task: TaskKind, text: &str) -> Self {
        self.responses.insert(task, Ok(text.to_string()));
        self
    }

    pub fn fail(mut self, task: TaskKind, failure: ScriptedFailure) -> Self {
        self.responses.insert(task, Err(failure));
        self
    }

    pub fn flaky(self, task: TaskKind, failures: u32) -> Self {
        self.flaky.lock().unwrap().insert(task, failures);
        self
    }

    pub fn tasks(&self) -> Vec<TaskKind> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn prompt_for(&self, task: TaskKind) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| *t == task)
            .map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl GenerationPort for ScriptedPort {
    async fn generate(&self, task: TaskKind, prompt: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((task, prompt.to_string()));

        if let Some(remaining) = self.flaky.lock().unwrap().get_mut(&task) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(LlmError::Api {
                    status: 529,
                    message: "overloaded".to_string(),
                });
            }
        }

        match self.responses.get(&task) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(ScriptedFailure::Configuration)) => Err(LlmError::Configuration(
                "environment variable 'ANTHROPIC_API_KEY' is not set".to_string(),
            )),
            Some(Err(ScriptedFailure::Provider)) | None => Err(LlmError::Api {
                status: 500,
                message: format!("no scripted response for {task}"),
            }),
        }
    }
}

/// Serves the same page text for every URL.
pub struct StaticPage(pub &'static str);

#[async_trait]
impl PageSource for StaticPage {
    async fn fetch_and_extract(&self, _url: &Url) -> Result<PageText, FetchError> {
        Ok(PageText::from_trusted(self.0))
    }
}

/// Every fetch times out.
pub struct UnreachablePage;

#[async_trait]
impl PageSource for UnreachablePage {
    async fn fetch_and_extract(&self, url: &Url) -> Result<PageText, FetchError> {
        Err(FetchError::Timeout {
            url: url.to_string(),
            timeout: std::time::Duration::from_secs(15),
        })
    }
}
