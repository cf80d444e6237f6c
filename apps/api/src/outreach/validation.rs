//! Structural contracts for each stage's parsed output.
//!
//! serde catches wrong types, missing fields and unknown enum values; the
//! `StageOutput::violations` hook adds the count rules serde cannot express.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::TaskKind;
use crate::outreach::models::{
    CopyResult, QaResult, ResearchResult, MAX_HOOKS, MIN_HOOKS, SUBJECT_LINE_COUNT,
};

#[derive(Debug, Error)]
#[error("{stage} agent output failed schema validation: {}", .details.join("; "))]
pub struct SchemaValidationError {
    pub stage: TaskKind,
    pub details: Vec<String>,
}

/// A typed stage result with its own contract.
pub trait StageOutput: DeserializeOwned {
    const STAGE: TaskKind;

    fn violations(&self) -> Vec<String>;
}

impl StageOutput for ResearchResult {
    const STAGE: TaskKind = TaskKind::Research;

    fn violations(&self) -> Vec<String> {
        let hooks = self.personalization_hooks.len();
        if (MIN_HOOKS..=MAX_HOOKS).contains(&hooks) {
            vec![]
        } else {
            vec![format!(
                "personalization_hooks: expected {MIN_HOOKS}-{MAX_HOOKS} items, got {hooks}"
            )]
        }
    }
}

impl StageOutput for CopyResult {
    const STAGE: TaskKind = TaskKind::Copy;

    fn violations(&self) -> Vec<String> {
        let lines = self.subject_lines.len();
        if lines == SUBJECT_LINE_COUNT {
            vec![]
        } else {
            vec![format!(
                "subject_lines: expected exactly {SUBJECT_LINE_COUNT} items, got {lines}"
            )]
        }
    }
}

impl StageOutput for QaResult {
    const STAGE: TaskKind = TaskKind::Qa;

    fn violations(&self) -> Vec<String> {
        vec![]
    }
}

/// Converts parsed JSON into a stage result, enforcing that stage's contract.
pub fn validate_stage_output<T: StageOutput>(value: Value) -> Result<T, SchemaValidationError> {
    let output: T = serde_json::from_value(value).map_err(|e| SchemaValidationError {
        stage: T::STAGE,
        details: vec![e.to_string()],
    })?;

    let details = output.violations();
    if details.is_empty() {
        Ok(output)
    } else {
        Err(SchemaValidationError {
            stage: T::STAGE,
            details,
        })
    }
}
