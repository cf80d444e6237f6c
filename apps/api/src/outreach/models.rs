//! Request, stage-output, and result types for the outreach pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::AppError;

pub const COMPANY_NAME_CHARS: (usize, usize) = (1, 200);
pub const TARGET_ROLE_CHARS: (usize, usize) = (1, 100);
pub const PRODUCT_DESCRIPTION_CHARS: (usize, usize) = (10, 500);
pub const OUTREACH_GOAL_CHARS: (usize, usize) = (5, 200);

/// Personalization hooks a research result may carry.
pub const MIN_HOOKS: usize = 1;
pub const MAX_HOOKS: usize = 5;
/// Subject lines a copy result must carry, no more and no less.
pub const SUBJECT_LINE_COUNT: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Inbound request
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Professional,
    Casual,
    Founder,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Professional, Tone::Casual, Tone::Founder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Founder => "founder",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str() == s)
            .ok_or_else(|| {
                format!("tone must be one of professional, casual, founder (got {s:?})")
            })
    }
}

/// Request body as it arrives on the wire. Call `validate()` before use.
#[derive(Debug, Clone, Deserialize)]
pub struct OutreachInput {
    pub company_name: String,
    pub company_website: String,
    pub target_role: String,
    pub product_description: String,
    pub outreach_goal: String,
    pub tone: String,
}

/// A validated, trimmed outreach request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutreachRequest {
    pub company_name: String,
    pub company_website: Url,
    pub target_role: String,
    pub product_description: String,
    pub outreach_goal: String,
    pub tone: Tone,
}

impl OutreachInput {
    /// Trims every string field and checks lengths, URL shape and tone.
    /// All violations are reported together.
    pub fn validate(&self) -> Result<OutreachRequest, AppError> {
        let mut violations = Vec::new();

        let company_name = bounded(
            "company_name",
            &self.company_name,
            COMPANY_NAME_CHARS,
            &mut violations,
        );
        let target_role = bounded(
            "target_role",
            &self.target_role,
            TARGET_ROLE_CHARS,
            &mut violations,
        );
        let product_description = bounded(
            "product_description",
            &self.product_description,
            PRODUCT_DESCRIPTION_CHARS,
            &mut violations,
        );
        let outreach_goal = bounded(
            "outreach_goal",
            &self.outreach_goal,
            OUTREACH_GOAL_CHARS,
            &mut violations,
        );

        let company_website = match parse_website(self.company_website.trim()) {
            Ok(url) => Some(url),
            Err(reason) => {
                violations.push(format!("company_website: {reason}"));
                None
            }
        };

        let tone = match self.tone.trim().parse::<Tone>() {
            Ok(tone) => Some(tone),
            Err(reason) => {
                violations.push(reason);
                None
            }
        };

        match (company_website, tone) {
            (Some(company_website), Some(tone)) if violations.is_empty() => Ok(OutreachRequest {
                company_name,
                company_website,
                target_role,
                product_description,
                outreach_goal,
                tone,
            }),
            _ => Err(AppError::Validation {
                message: "Request validation failed".to_string(),
                details: violations,
            }),
        }
    }
}

fn bounded(
    field: &str,
    raw: &str,
    (min, max): (usize, usize),
    violations: &mut Vec<String>,
) -> String {
    let value = raw.trim();
    let len = value.chars().count();
    if len < min || len > max {
        violations.push(format!(
            "{field}: must be {min}-{max} characters after trimming (got {len})"
        ));
    }
    value.to_string()
}

fn parse_website(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("not a valid URL ({e})"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("scheme must be http or https (got {})", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("URL must include a host".to_string());
    }
    Ok(url)
}

// ────────────────────────────────────────────────────────────────────────────
// Stage outputs
// ────────────────────────────────────────────────────────────────────────────

/// What the research stage learns about the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub industry: String,
    pub value_proposition: String,
    pub personalization_hooks: Vec<String>,
    pub company_summary: String,
}

/// Drafted emails from the copy stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyResult {
    pub subject_lines: Vec<String>,
    pub primary_email: String,
    pub follow_up_email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpamRisk {
    Low,
    Medium,
    High,
}

/// The QA stage's read-only verdict on the drafted emails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
    pub spam_risk_score: SpamRisk,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub analysis_notes: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline result
// ────────────────────────────────────────────────────────────────────────────

/// The externally visible result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachResult {
    pub subject_lines: Vec<String>,
    pub primary_email: String,
    pub follow_up_email: String,
    pub personalization_points: Vec<String>,
    pub spam_risk_score: SpamRisk,
}

impl OutreachResult {
    pub fn assemble(research: ResearchResult, copy: CopyResult, qa: QaResult) -> Self {
        Self {
            subject_lines: copy.subject_lines,
            primary_email: copy.primary_email,
            follow_up_email: copy.follow_up_email,
            personalization_points: research.personalization_hooks,
            spam_risk_score: qa.spam_risk_score,
        }
    }
}
