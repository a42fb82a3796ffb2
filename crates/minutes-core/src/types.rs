use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Priority of an extracted action item.
///
/// The extraction capability emits the variant names verbatim ("High",
/// "Medium", "Low"); anything else deserializes to `Medium`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Low,
    #[default]
    #[serde(other)]
    Medium,
}

// =============================================================================
// Newtype Wrappers - Identity
// =============================================================================

/// Unique identifier for a processed meeting.
///
/// Assigned once when the pipeline creates the record; never reused. A
/// retried upload gets a fresh id. Ordering is byte order of the UUID, which
/// matches canonical-string order; the search tie-break relies on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeetingId(pub Uuid);

impl MeetingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MeetingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MeetingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for MeetingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// =============================================================================
// Entity Structs (defined in minutes-core for shared use)
// =============================================================================

/// One action item extracted from a transcript.
///
/// The extraction capability may omit any field; missing fields default to
/// empty strings (priority to Medium) rather than failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub priority: Priority,
}

/// One decision extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub impact: String,
}

/// A fully processed meeting record.
///
/// Created exactly once, after transcription and analysis both succeed;
/// transcript and summary are always set together. Never mutated afterwards.
/// Duration is in seconds, as reported by the transcription capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    pub attendees: String,
    pub transcript: String,
    pub summary: String,
    pub action_items: Vec<ActionItem>,
    pub decisions: Vec<Decision>,
    pub duration_secs: f64,
    /// Path of the stored upload.
    pub audio_path: String,
    /// Path of the generated visual, when synthesis succeeded.
    pub visual_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listing row for a meeting: everything except the full transcript and the
/// extracted structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingOverview {
    pub id: MeetingId,
    pub title: String,
    pub attendees: String,
    pub summary: String,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
}

/// One embeddable unit of a transcript, ready for insertion.
///
/// Indices are 0-based and contiguous within a meeting. The vector length is
/// the corpus-wide embedding dimension; the indexer rejects anything else
/// before it gets here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub index: u32,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// One row of the search corpus: a chunk joined with its meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusChunk {
    pub meeting_id: MeetingId,
    pub chunk_index: u32,
    pub text: String,
    pub embedding: Vec<f32>,
    pub title: String,
    pub summary: String,
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub meeting_id: MeetingId,
    pub chunk_index: u32,
    pub text: String,
    pub similarity: f64,
    pub title: String,
    pub summary: String,
}

/// One prompt/completion pair derived from a meeting for model tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub prompt: String,
    pub completion: String,
    pub meeting_id: MeetingId,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_id_new_is_unique() {
        let a = MeetingId::new();
        let b = MeetingId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_meeting_id_display_parse_roundtrip() {
        let id = MeetingId::new();
        let parsed: MeetingId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_meeting_id_parse_rejects_garbage() {
        let result = "not-a-uuid".parse::<MeetingId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_meeting_id_ordering_matches_string_ordering() {
        let mut ids: Vec<MeetingId> = (0..32).map(|_| MeetingId::new()).collect();
        let mut by_string = ids.clone();
        ids.sort();
        by_string.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        assert_eq!(ids, by_string);
    }

    #[test]
    fn test_priority_serde_exact_names() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        assert_eq!(
            serde_json::to_string(&Priority::Medium).unwrap(),
            "\"Medium\""
        );
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"Low\"");

        let p: Priority = serde_json::from_str("\"High\"").unwrap();
        assert_eq!(p, Priority::High);
    }

    #[test]
    fn test_priority_unknown_falls_back_to_medium() {
        let p: Priority = serde_json::from_str("\"Urgent\"").unwrap();
        assert_eq!(p, Priority::Medium);
    }

    #[test]
    fn test_action_item_missing_fields_default() {
        let item: ActionItem = serde_json::from_str(r#"{"task": "ship it"}"#).unwrap();
        assert_eq!(item.task, "ship it");
        assert_eq!(item.owner, "");
        assert_eq!(item.deadline, "");
        assert_eq!(item.priority, Priority::Medium);
    }

    #[test]
    fn test_decision_missing_fields_default() {
        let d: Decision = serde_json::from_str(r#"{"decision": "adopt SQLite"}"#).unwrap();
        assert_eq!(d.decision, "adopt SQLite");
        assert_eq!(d.rationale, "");
        assert_eq!(d.impact, "");
    }

    #[test]
    fn test_meeting_serde_roundtrip() {
        let meeting = Meeting {
            id: MeetingId::new(),
            title: "Quarterly planning".to_string(),
            attendees: "Alice, Bob".to_string(),
            transcript: "We discussed the roadmap.".to_string(),
            summary: "Roadmap discussion.".to_string(),
            action_items: vec![ActionItem {
                task: "Draft roadmap".to_string(),
                owner: "Alice".to_string(),
                deadline: "Friday".to_string(),
                priority: Priority::High,
            }],
            decisions: vec![Decision {
                decision: "Ship in Q3".to_string(),
                rationale: "Customer demand".to_string(),
                impact: "High".to_string(),
            }],
            duration_secs: 1800.0,
            audio_path: "uploads/20250101_120000_standup.mp3".to_string(),
            visual_path: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&meeting).unwrap();
        let back: Meeting = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meeting);
    }

    #[test]
    fn test_stored_chunk_roundtrip() {
        let chunk = StoredChunk {
            index: 2,
            text: "chunk text".to_string(),
            embedding: vec![0.25, -0.5, 1.0],
        };
        let json = serde_json::to_string(&chunk).unwrap();
        let back: StoredChunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }
}
