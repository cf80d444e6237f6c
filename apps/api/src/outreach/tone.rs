//! Tone calibration — maps the requested tone to the writing guideline the copy
//! stage embeds in its prompt.

use crate::outreach::models::Tone;

/// Guideline text for a tone.
///
/// The match is exhaustive, so there is no fallback branch: an unrecognised
/// tone string is rejected by `OutreachInput::validate` before it can get here.
pub fn tone_guideline(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => {
            "Formal, respectful, business-appropriate. Use proper titles."
        }
        Tone::Casual => "Friendly but not unprofessional. First-name basis. Conversational.",
        Tone::Founder => "Direct, founder-to-founder. Mention building/shipping. No fluff.",
    }
}

/// Human label used by `/input_schema`.
pub fn tone_label(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => "Professional",
        Tone::Casual => "Casual",
        Tone::Founder => "Founder-to-Founder",
    }
}
