//! Recovers a JSON object from free-form model output.
//!
//! Models wrap JSON in code fences, prefix it with commentary, or trail it with
//! notes regardless of what the prompt says. Two passes:
//! 1. if a fenced block (optionally tagged `json`) holds a `{...}` span, keep only
//!    its inner content;
//! 2. within that text, take the first brace span that balances with at most one
//!    level of nesting.
//!
//! The result must then parse strictly as a JSON object.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::TaskKind;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced block regex is valid")
});

static BARE_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("bare object regex is valid")
});

/// How much of the offending text is kept for diagnostics.
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
#[error("Failed to parse {stage} agent output as JSON: {reason}")]
pub struct OutputParseError {
    pub stage: TaskKind,
    pub reason: String,
    /// Line and column reported by the JSON parser, when it got that far.
    pub position: Option<(usize, usize)>,
    pub excerpt: String,
}

impl OutputParseError {
    pub fn details(&self) -> Vec<String> {
        let mut details = vec![format!("stage: {}", self.stage)];
        if let Some((line, column)) = self.position {
            details.push(format!("position: line {line}, column {column}"));
        }
        details.push(format!("raw: {}", self.excerpt));
        details
    }
}

/// Extracts the JSON object a stage's raw output most likely contains.
pub fn extract_json_object(raw: &str, stage: TaskKind) -> Result<Value, OutputParseError> {
    let mut candidate = raw;

    if let Some(inner) = FENCED_BLOCK.captures(candidate).and_then(|c| c.get(1)) {
        candidate = inner.as_str();
    }

    if let Some(object) = BARE_OBJECT.find(candidate) {
        candidate = object.as_str();
    }

    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(OutputParseError {
            stage,
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
            position: None,
            excerpt: excerpt(candidate),
        }),
        Err(e) => Err(OutputParseError {
            stage,
            reason: e.to_string(),
            position: Some((e.line(), e.column())),
            excerpt: excerpt(candidate),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
