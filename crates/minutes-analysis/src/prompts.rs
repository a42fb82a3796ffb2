//! Prompt text and tool schemas for the analysis calls.
//!
//! The extraction call offers two function tools and lets the model decide
//! which to invoke; summarization is a plain completion. Wording is tuned
//! for business meeting transcripts.

use minutes_openai::ToolSpec;

/// Tool the model calls to report extracted action items.
pub const ACTION_ITEMS_TOOL: &str = "record_action_items";

/// Tool the model calls to report extracted decisions.
pub const DECISIONS_TOOL: &str = "record_decisions";

/// System prompt for the extraction call.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are an assistant specialized in analyzing \
business meeting transcripts. Your task is to extract actionable insights and key decisions. \
Focus on identifying specific action items with clear ownership and deadlines.";

/// System prompt for the summarization call.
pub const SUMMARY_SYSTEM_PROMPT: &str =
    "You are an expert meeting summarizer. Create concise, actionable summaries.";

/// User prompt for the extraction call.
pub fn extraction_prompt(transcript: &str) -> String {
    format!(
        "Analyze this meeting transcript and record the action items (with owners and \
         deadlines) and the key decisions made.\n\nTranscript: {}",
        transcript
    )
}

/// User prompt for the summarization call.
pub fn summary_prompt(transcript: &str) -> String {
    format!(
        "Create a comprehensive but concise summary of this meeting: {}",
        transcript
    )
}

/// Prompt for generating an infographic from a summary prefix.
pub fn visual_prompt(summary_prefix: &str) -> String {
    format!(
        "Create a professional business infographic that represents the key points of this \
         meeting summary: {}\nStyle: Clean, modern, corporate infographic with icons and visual \
         elements representing meeting outcomes, decisions, and action items.\nInclude: Charts, \
         arrows, icons for teamwork, decisions, and progress. Use a professional color scheme.",
        summary_prefix
    )
}

/// Schema of the action item tool.
pub fn action_items_tool() -> ToolSpec {
    ToolSpec {
        name: ACTION_ITEMS_TOOL.to_string(),
        description: "Record action items with owners and deadlines".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "action_items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "task": {"type": "string"},
                            "owner": {"type": "string"},
                            "deadline": {"type": "string"},
                            "priority": {"type": "string", "enum": ["High", "Medium", "Low"]}
                        }
                    }
                }
            }
        }),
    }
}

/// Schema of the decision tool.
pub fn decisions_tool() -> ToolSpec {
    ToolSpec {
        name: DECISIONS_TOOL.to_string(),
        description: "Record key decisions made during the meeting".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "decisions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "decision": {"type": "string"},
                            "rationale": {"type": "string"},
                            "impact": {"type": "string"}
                        }
                    }
                }
            }
        }),
    }
}

/// Truncate to at most `max_chars` characters, cutting on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
