use std::str::FromStr;

/// Named prompt-construction strategies for framing a transcript
/// before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryType {
    /// Plain summarization request
    Standard,
    /// Cover every topic discussed in the meeting
    Comprehensive,
    /// Include key points and decisions
    Detailed,
    /// Focus on action items and next steps
    ActionFocused,
}

impl SummaryType {
    /// Wire name of the summary type, as accepted and echoed by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Standard => "standard",
            SummaryType::Comprehensive => "comprehensive",
            SummaryType::Detailed => "detailed",
            SummaryType::ActionFocused => "action_focused",
        }
    }

    /// Instruction prefix used when prompting the fine-tuned model.
    fn instruction(&self) -> &'static str {
        match self {
            SummaryType::Standard => "summarize: ",
            SummaryType::Comprehensive => {
                "summarize comprehensively, covering every topic discussed: "
            }
            SummaryType::Detailed => {
                "summarize in detail, including key points and decisions made: "
            }
            SummaryType::ActionFocused => {
                "summarize focusing on action items, owners and next steps: "
            }
        }
    }
}

impl FromStr for SummaryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(SummaryType::Standard),
            "comprehensive" => Ok(SummaryType::Comprehensive),
            "detailed" => Ok(SummaryType::Detailed),
            "action_focused" => Ok(SummaryType::ActionFocused),
            other => Err(format!(
                "Unknown summary_type '{}'. Must be one of: standard, comprehensive, detailed, action_focused",
                other
            )),
        }
    }
}

/// Folds the optional meeting context into the transcript text.
fn with_context(text: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("Meeting Context: {}\n\nTranscript: {}", context, text),
        None => text.to_string(),
    }
}

/// Builds the prompt for the fine-tuned model. The model was trained on
/// instruction-prefixed inputs, so the summary type selects the prefix.
pub fn build_primary_prompt(text: &str, context: Option<&str>, summary_type: SummaryType) -> String {
    format!("{}{}", summary_type.instruction(), with_context(text, context))
}

/// Builds the prompt for a pretrained fallback model. Those models expect
/// the document itself rather than an instruction, so only the meeting
/// context is folded in.
pub fn build_fallback_prompt(text: &str, context: Option<&str>) -> String {
    with_context(text, context)
}
