//! Content analysis: structured extraction plus summarization.

use serde::Deserialize;
use tracing::debug;

use minutes_core::error::MinutesError;
use minutes_core::types::{ActionItem, Decision};
use minutes_openai::{DynLanguageService, LanguageService, ToolInvocation};

use crate::prompts::{
    action_items_tool, decisions_tool, extraction_prompt, summary_prompt, truncate_chars,
    ACTION_ITEMS_TOOL, DECISIONS_TOOL, EXTRACTION_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT,
};

/// Everything the chat capability produced for one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingAnalysis {
    pub summary: String,
    pub action_items: Vec<ActionItem>,
    pub decisions: Vec<Decision>,
}

/// Analyzes a transcript with two chat calls: a tool-calling extraction and
/// a plain summarization.
///
/// The calls are independent and run concurrently; either failing fails the
/// whole analysis. A model that calls neither tool yields empty action item
/// and decision lists, which is a valid outcome for contentless meetings.
pub struct ContentAnalyzer {
    language: Box<dyn DynLanguageService>,
    max_input_chars: usize,
}

impl ContentAnalyzer {
    pub fn new(language: impl LanguageService + 'static, max_input_chars: usize) -> Self {
        Self::new_dyn(Box::new(language), max_input_chars)
    }

    pub fn new_dyn(language: Box<dyn DynLanguageService>, max_input_chars: usize) -> Self {
        Self {
            language,
            max_input_chars,
        }
    }

    /// Run extraction and summarization over the transcript.
    ///
    /// The transcript is truncated to `max_input_chars` characters before
    /// both calls; one rule, cut on a char boundary.
    pub async fn analyze(&self, transcript: &str) -> Result<MeetingAnalysis, MinutesError> {
        let input = truncate_chars(transcript, self.max_input_chars);

        let (extracted, summary) = tokio::join!(self.extract(input), self.summarize(input));
        let (action_items, decisions) = extracted?;
        let summary = summary?;

        debug!(
            action_items = action_items.len(),
            decisions = decisions.len(),
            summary_chars = summary.len(),
            "Content analysis complete"
        );
        Ok(MeetingAnalysis {
            summary,
            action_items,
            decisions,
        })
    }

    async fn extract(
        &self,
        input: &str,
    ) -> Result<(Vec<ActionItem>, Vec<Decision>), MinutesError> {
        let tools = [action_items_tool(), decisions_tool()];
        let prompt = extraction_prompt(input);
        let calls = self
            .language
            .call_tools_boxed(EXTRACTION_SYSTEM_PROMPT, &prompt, &tools)
            .await?;
        parse_invocations(&calls)
    }

    async fn summarize(&self, input: &str) -> Result<String, MinutesError> {
        let prompt = summary_prompt(input);
        self.language
            .complete_boxed(SUMMARY_SYSTEM_PROMPT, &prompt)
            .await
    }
}

/// Collect action items and decisions from the model's tool calls. The first
/// call per tool wins; unknown tool names are ignored.
fn parse_invocations(
    calls: &[ToolInvocation],
) -> Result<(Vec<ActionItem>, Vec<Decision>), MinutesError> {
    let mut action_items: Option<Vec<ActionItem>> = None;
    let mut decisions: Option<Vec<Decision>> = None;

    for call in calls {
        match call.name.as_str() {
            ACTION_ITEMS_TOOL if action_items.is_none() => {
                let args: ActionItemArgs = parse_arguments(&call.name, &call.arguments)?;
                action_items = Some(args.action_items);
            }
            DECISIONS_TOOL if decisions.is_none() => {
                let args: DecisionArgs = parse_arguments(&call.name, &call.arguments)?;
                decisions = Some(args.decisions);
            }
            _ => {}
        }
    }

    Ok((
        action_items.unwrap_or_default(),
        decisions.unwrap_or_default(),
    ))
}

/// The model produced these arguments; malformed JSON is an upstream fault,
/// not a local serialization bug.
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool: &str,
    arguments: &str,
) -> Result<T, MinutesError> {
    serde_json::from_str(arguments).map_err(|e| {
        MinutesError::UpstreamService(format!("Arguments of {} are not valid JSON: {}", tool, e))
    })
}

#[derive(Deserialize)]
struct ActionItemArgs {
    #[serde(default)]
    action_items: Vec<ActionItem>,
}

#[derive(Deserialize)]
struct DecisionArgs {
    #[serde(default)]
    decisions: Vec<Decision>,
}
