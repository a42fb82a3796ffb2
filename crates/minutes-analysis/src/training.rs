//! Training example derivation from stored meetings.

use minutes_core::error::MinutesError;
use minutes_core::types::{Meeting, TrainingExample};

use crate::prompts::truncate_chars;

/// Characters of transcript kept in each training prompt.
const PROMPT_PREFIX_CHARS: usize = 500;

/// Derive prompt/completion pairs from one meeting.
///
/// A summarization pair is emitted when the meeting has a summary, and an
/// extraction pair (completion is the action items as JSON) when it has
/// action items. Meetings with neither produce no examples.
pub fn build_training_examples(meeting: &Meeting) -> Result<Vec<TrainingExample>, MinutesError> {
    let prefix = truncate_chars(&meeting.transcript, PROMPT_PREFIX_CHARS);
    let mut examples = Vec::new();

    if !meeting.summary.is_empty() {
        examples.push(TrainingExample {
            prompt: format!("Summarize this meeting transcript: {}", prefix),
            completion: meeting.summary.clone(),
            meeting_id: meeting.id,
        });
    }

    if !meeting.action_items.is_empty() {
        examples.push(TrainingExample {
            prompt: format!("Extract action items from: {}", prefix),
            completion: serde_json::to_string(&meeting.action_items)?,
            meeting_id: meeting.id,
        });
    }

    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use minutes_core::types::{ActionItem, MeetingId, Priority};

    fn meeting(transcript: &str, summary: &str, items: Vec<ActionItem>) -> Meeting {
        Meeting {
            id: MeetingId::new(),
            title: "Planning".to_string(),
            attendees: "Alice, Bob".to_string(),
            transcript: transcript.to_string(),
            summary: summary.to_string(),
            action_items: items,
            decisions: Vec::new(),
            duration_secs: 600.0,
            audio_path: "uploads/a.mp3".to_string(),
            visual_path: None,
            created_at: Utc::now(),
        }
    }

    fn item(task: &str) -> ActionItem {
        ActionItem {
            task: task.to_string(),
            owner: "Alice".to_string(),
            deadline: "Friday".to_string(),
            priority: Priority::High,
        }
    }

    #[test]
    fn test_full_meeting_yields_both_pairs() {
        let m = meeting("We planned Q3.", "Q3 planning.", vec![item("Draft roadmap")]);
        let examples = build_training_examples(&m).unwrap();

        assert_eq!(examples.len(), 2);
        assert!(examples[0].prompt.starts_with("Summarize this meeting transcript:"));
        assert_eq!(examples[0].completion, "Q3 planning.");
        assert!(examples[1].prompt.starts_with("Extract action items from:"));
        assert_eq!(examples[0].meeting_id, m.id);
        assert_eq!(examples[1].meeting_id, m.id);
    }

    #[test]
    fn test_extraction_completion_is_parseable_json() {
        let m = meeting("t", "s", vec![item("Draft roadmap"), item("Review budget")]);
        let examples = build_training_examples(&m).unwrap();

        let parsed: Vec<ActionItem> = serde_json::from_str(&examples[1].completion).unwrap();
        assert_eq!(parsed, m.action_items);
    }

    #[test]
    fn test_empty_summary_skips_summary_pair() {
        let m = meeting("t", "", vec![item("Draft roadmap")]);
        let examples = build_training_examples(&m).unwrap();

        assert_eq!(examples.len(), 1);
        assert!(examples[0].prompt.starts_with("Extract action items from:"));
    }

    #[test]
    fn test_no_action_items_skips_extraction_pair() {
        let m = meeting("t", "A summary.", Vec::new());
        let examples = build_training_examples(&m).unwrap();

        assert_eq!(examples.len(), 1);
        assert!(examples[0].prompt.starts_with("Summarize"));
    }

    #[test]
    fn test_meeting_with_neither_yields_nothing() {
        let m = meeting("t", "", Vec::new());
        assert!(build_training_examples(&m).unwrap().is_empty());
    }

    #[test]
    fn test_prompt_uses_transcript_prefix() {
        let transcript = "a".repeat(600);
        let m = meeting(&transcript, "s", Vec::new());
        let examples = build_training_examples(&m).unwrap();

        let expected = format!("Summarize this meeting transcript: {}", "a".repeat(500));
        assert_eq!(examples[0].prompt, expected);
    }
}
