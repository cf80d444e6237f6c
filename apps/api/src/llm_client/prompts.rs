// Shared prompt constants.
// Each stage owns its own template in outreach::prompts; this file holds
// cross-cutting fragments.

/// System prompt sent with every generation call. Models still ignore it often
/// enough that stage output always goes through `outreach::json_extract`.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to prompts that work from scraped website text.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Only state facts found in the supplied content. \
    Do NOT infer, assume, or invent details. \
    If the content does not support a claim, omit it entirely.";

/// Closing line of every stage prompt.
pub const RETURN_JSON_ONLY: &str = "Return ONLY the JSON object, nothing else.";
