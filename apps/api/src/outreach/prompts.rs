// Prompt templates for the three outreach stages.
// Placeholders are filled by `fill_template` in the stage that owns them.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"));

/// Fills every `{name}` in `template` in a single pass. Substituted values are
/// never rescanned, so braces in user input or page text stay literal.
/// Names `value_for` does not know are left untouched.
pub fn fill_template<'a>(template: &str, value_for: impl Fn(&str) -> Option<&'a str>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match value_for(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Research prompt. Replace: {company_name}, {target_role}, {page_text},
/// {grounding_instruction}, {return_json_only}
pub const RESEARCH_PROMPT_TEMPLATE: &str = r#"Analyze the following company information and extract key details.

COMPANY: {company_name}
TARGET RECIPIENT ROLE: {target_role}

WEBSITE CONTENT:
{page_text}

YOUR TASK:
1. Identify the company's industry/sector
2. Extract their main value proposition (what they offer and why it matters)
3. Find 3-5 personalization hooks - specific facts that could be referenced in a cold email
4. Write a brief 2-3 sentence company summary

RULES:
{grounding_instruction}
- No assumptions or opinions
- Personalization hooks must be specific and verifiable
- Focus on details relevant to the target role: {target_role}

OUTPUT FORMAT (JSON only, no markdown):
{
    "industry": "string",
    "value_proposition": "string",
    "personalization_hooks": ["string", "string", "string"],
    "company_summary": "string"
}

{return_json_only}"#;

/// Copy prompt. Replace: {company_name}, {target_role}, {product_description},
/// {outreach_goal}, {tone}, {tone_guideline}, {research_json}, {return_json_only}
pub const COPY_PROMPT_TEMPLATE: &str = r#"Write cold outreach emails based on the research provided.

CONTEXT:
- Company: {company_name}
- Recipient Role: {target_role}
- Your Product: {product_description}
- Goal: {outreach_goal}
- Tone: {tone} - {tone_guideline}

RESEARCH DATA:
{research_json}

DELIVERABLES:

1. THREE SUBJECT LINES
   - Exactly 3, each under 50 characters
   - No clickbait
   - Reference the company or role when possible

2. PRIMARY EMAIL
   - Maximum 120 words
   - Open with personalization from the research data
   - Connect their situation to your product
   - End with a clear call-to-action tied to: {outreach_goal}

3. FOLLOW-UP EMAIL
   - Maximum 120 words
   - Reference the first email
   - Add a new angle or piece of value
   - Softer call-to-action than the primary email

STRICT RULES:
- ZERO emojis
- ZERO exclamation marks
- No "I hope this email finds you well"
- No "Just following up"
- No "Reaching out because"
- The last sentence of each email MUST be the call-to-action

OUTPUT FORMAT (JSON only, no markdown):
{
    "subject_lines": ["line1", "line2", "line3"],
    "primary_email": "string",
    "follow_up_email": "string"
}

{return_json_only}"#;

/// QA prompt. Replace: {copy_json}, {return_json_only}
pub const QA_PROMPT_TEMPLATE: &str = r#"You are a read-only auditor. Analyze the following cold emails for spam risk.

EMAILS TO ANALYZE:
{copy_json}

SPAM RISK SIGNALS TO COUNT:

1. SALES PHRASE OVERUSE:
   - "Revolutionary", "Game-changing", "Best-in-class"
   - "Act now", "Limited time", "Don't miss out"
   - "Guaranteed", "Risk-free", "No obligation"
   - Multiple value claims without proof

2. URGENCY SIGNALS:
   - Artificial deadlines
   - Pressure tactics
   - FOMO language
   - Multiple calls-to-action

3. GENERIC PERSONALIZATION:
   - Generic compliments ("I love what you're doing")
   - Name-only personalization
   - Obvious template language

4. FORMAT RED FLAGS:
   - ALL CAPS words
   - Emojis present
   - Exclamation marks present
   - Excessive length

SCORING (by total issue count):
- "low": 0-1 issues
- "medium": 2-3 issues
- "high": 4 or more issues

YOUR TASK:
1. Count and list every risk factor found
2. Assign spam_risk_score using the thresholds above
3. Write brief analysis notes

DO NOT:
- Suggest rewrites
- Judge content quality beyond the signals above
- Change any email text

OUTPUT FORMAT (JSON only, no markdown):
{
    "spam_risk_score": "low",
    "risk_factors": ["factor1", "factor2"],
    "analysis_notes": "string"
}

{return_json_only}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_is_single_pass() {
        let filled = fill_template("{a} and {b}", |name| match name {
            "a" => Some("{b}"),
            "b" => Some("bee"),
            _ => None,
        });
        assert_eq!(filled, "{b} and bee");
    }

    #[test]
    fn test_fill_template_leaves_unknown_and_json_braces() {
        let filled = fill_template("{known} {unknown} {\n  \"k\": 1\n}", |name| {
            (name == "known").then_some("x")
        });
        assert_eq!(filled, "x {unknown} {\n  \"k\": 1\n}");
    }
}
