//! Repository implementations for SQLite-backed persistence.
//!
//! Provides MeetingRepository, ChunkRepository, and TrainingExampleRepository
//! that operate on the Database struct using raw SQL. The two multi-statement
//! writes (meeting creation, chunk-batch insertion) each run inside their own
//! scoped transaction; they are deliberately not one transaction together, so
//! a meeting can exist with zero chunks and readers must tolerate that.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use minutes_core::error::MinutesError;
use minutes_core::types::{
    CorpusChunk, Meeting, MeetingId, MeetingOverview, StoredChunk, TrainingExample,
};

use crate::db::Database;

/// Aggregate counters over the stored corpus.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalyticsSummary {
    pub total_meetings: u64,
    /// Mean duration over meetings with a positive duration, rounded to two
    /// decimal places. 0.0 when no such meeting exists.
    pub average_duration_secs: f64,
    pub searchable_chunks: u64,
}

/// Repository for meeting records.
pub struct MeetingRepository {
    db: Arc<Database>,
}

impl MeetingRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new meeting record. Returns the id carried by the record.
    ///
    /// The insert runs in its own scoped transaction. Inserting the same id
    /// twice is a persistence error.
    pub fn create(&self, meeting: &Meeting) -> Result<MeetingId, MinutesError> {
        let action_items = serde_json::to_string(&meeting.action_items)?;
        let decisions = serde_json::to_string(&meeting.decisions)?;

        self.db.with_conn(|conn| {
            // The mutex in Database guarantees no nested transaction here.
            let tx = conn.unchecked_transaction().map_err(|e| {
                MinutesError::Persistence(format!("Failed to begin transaction: {}", e))
            })?;
            tx.execute(
                "INSERT INTO meetings (id, title, attendees, transcript, summary, action_items, decisions, duration_secs, audio_path, visual_path, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    meeting.id.to_string(),
                    meeting.title,
                    meeting.attendees,
                    meeting.transcript,
                    meeting.summary,
                    action_items,
                    decisions,
                    meeting.duration_secs,
                    meeting.audio_path,
                    meeting.visual_path,
                    meeting.created_at.timestamp(),
                ],
            )
            .map_err(|e| MinutesError::Persistence(format!("Failed to save meeting: {}", e)))?;
            tx.commit()
                .map_err(|e| MinutesError::Persistence(format!("Failed to commit meeting: {}", e)))?;
            Ok(meeting.id)
        })
    }

    /// Find a meeting by ID.
    pub fn find_by_id(&self, id: MeetingId) -> Result<Option<Meeting>, MinutesError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, attendees, transcript, summary, action_items, decisions, duration_secs, audio_path, visual_path, created_at
                     FROM meetings WHERE id = ?1",
                )
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_meeting(row))
                })
                .optional()
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            match result {
                Some(meeting) => Ok(Some(meeting?)),
                None => Ok(None),
            }
        })
    }

    /// Load every meeting as a full record, most recent first.
    ///
    /// Pulls transcripts and parsed lists for all rows, so this is for batch
    /// jobs like training-data export, not for listings.
    pub fn all(&self) -> Result<Vec<Meeting>, MinutesError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, attendees, transcript, summary, action_items, decisions, duration_secs, audio_path, visual_path, created_at
                     FROM meetings
                     ORDER BY created_at DESC, rowid DESC",
                )
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| Ok(row_to_meeting(row)))
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let mut meetings = Vec::new();
            for row in rows {
                let meeting = row.map_err(|e| MinutesError::Persistence(e.to_string()))??;
                meetings.push(meeting);
            }
            Ok(meetings)
        })
    }

    /// List all meetings, most recent first.
    ///
    /// Ties on created_at fall back to insertion order, newest first, so the
    /// ordering is stable within one second.
    pub fn list_recent(&self) -> Result<Vec<MeetingOverview>, MinutesError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, attendees, summary, duration_secs, created_at
                     FROM meetings
                     ORDER BY created_at DESC, rowid DESC",
                )
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| Ok(row_to_overview(row)))
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let mut meetings = Vec::new();
            for row in rows {
                let meeting = row.map_err(|e| MinutesError::Persistence(e.to_string()))??;
                meetings.push(meeting);
            }
            Ok(meetings)
        })
    }

    /// Count stored meetings.
    pub fn count(&self) -> Result<u64, MinutesError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM meetings", [], |row| row.get(0))
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Aggregate counters for the analytics endpoint.
    pub fn analytics(&self) -> Result<AnalyticsSummary, MinutesError> {
        self.db.with_conn(|conn| {
            let total_meetings: i64 = conn
                .query_row("SELECT COUNT(*) FROM meetings", [], |row| row.get(0))
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let average: Option<f64> = conn
                .query_row(
                    "SELECT AVG(duration_secs) FROM meetings WHERE duration_secs > 0",
                    [],
                    |row| row.get(0),
                )
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let searchable_chunks: i64 = conn
                .query_row("SELECT COUNT(*) FROM meeting_chunks", [], |row| row.get(0))
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            Ok(AnalyticsSummary {
                total_meetings: total_meetings as u64,
                average_duration_secs: (average.unwrap_or(0.0) * 100.0).round() / 100.0,
                searchable_chunks: searchable_chunks as u64,
            })
        })
    }
}

/// Repository for embedded transcript chunks.
pub struct ChunkRepository {
    db: Arc<Database>,
}

impl ChunkRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert the full chunk set for one meeting in a single transaction.
    ///
    /// All-or-nothing: if any row fails (missing meeting, duplicate index),
    /// nothing is stored. An empty slice is a no-op.
    pub fn insert_batch(
        &self,
        meeting_id: MeetingId,
        chunks: &[StoredChunk],
    ) -> Result<(), MinutesError> {
        if chunks.is_empty() {
            return Ok(());
        }

        self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction().map_err(|e| {
                MinutesError::Persistence(format!("Failed to begin transaction: {}", e))
            })?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO meeting_chunks (meeting_id, chunk_index, text, embedding)
                         VALUES (?1, ?2, ?3, ?4)",
                    )
                    .map_err(|e| MinutesError::Persistence(e.to_string()))?;

                for chunk in chunks {
                    stmt.execute(rusqlite::params![
                        meeting_id.to_string(),
                        chunk.index,
                        chunk.text,
                        encode_embedding(&chunk.embedding),
                    ])
                    .map_err(|e| {
                        MinutesError::Persistence(format!(
                            "Failed to save chunk {}: {}",
                            chunk.index, e
                        ))
                    })?;
                }
            }
            tx.commit()
                .map_err(|e| MinutesError::Persistence(format!("Failed to commit chunks: {}", e)))?;
            Ok(())
        })
    }

    /// Load the entire search corpus: every chunk joined with its meeting.
    ///
    /// Meetings without chunks contribute no rows, which is how a meeting
    /// whose indexing failed stays out of search results.
    pub fn corpus(&self) -> Result<Vec<CorpusChunk>, MinutesError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT c.meeting_id, c.chunk_index, c.text, c.embedding, m.title, m.summary
                     FROM meeting_chunks c
                     JOIN meetings m ON m.id = c.meeting_id",
                )
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| Ok(row_to_corpus_chunk(row)))
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;

            let mut corpus = Vec::new();
            for row in rows {
                let chunk = row.map_err(|e| MinutesError::Persistence(e.to_string()))??;
                corpus.push(chunk);
            }
            Ok(corpus)
        })
    }

    /// Count all stored chunks.
    pub fn count(&self) -> Result<u64, MinutesError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM meeting_chunks", [], |row| row.get(0))
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Count chunks belonging to one meeting.
    pub fn count_for_meeting(&self, meeting_id: MeetingId) -> Result<u64, MinutesError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM meeting_chunks WHERE meeting_id = ?1",
                    rusqlite::params![meeting_id.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

/// Repository for training example pairs.
pub struct TrainingExampleRepository {
    db: Arc<Database>,
}

impl TrainingExampleRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a batch of training examples in one transaction.
    ///
    /// Returns the number of rows written.
    pub fn insert_batch(&self, examples: &[TrainingExample]) -> Result<u64, MinutesError> {
        if examples.is_empty() {
            return Ok(0);
        }

        self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction().map_err(|e| {
                MinutesError::Persistence(format!("Failed to begin transaction: {}", e))
            })?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO training_examples (prompt, completion, meeting_id)
                         VALUES (?1, ?2, ?3)",
                    )
                    .map_err(|e| MinutesError::Persistence(e.to_string()))?;

                for example in examples {
                    stmt.execute(rusqlite::params![
                        example.prompt,
                        example.completion,
                        example.meeting_id.to_string(),
                    ])
                    .map_err(|e| {
                        MinutesError::Persistence(format!("Failed to save example: {}", e))
                    })?;
                }
            }
            tx.commit().map_err(|e| {
                MinutesError::Persistence(format!("Failed to commit examples: {}", e))
            })?;
            Ok(examples.len() as u64)
        })
    }

    /// Count stored training examples.
    pub fn count(&self) -> Result<u64, MinutesError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM training_examples", [], |row| {
                    row.get(0)
                })
                .map_err(|e| MinutesError::Persistence(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

// ============================================================================
// Embedding BLOB codec.
// ============================================================================

/// Encode a vector as little-endian f32 bytes for BLOB storage.
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a vector.
///
/// A length that is not a multiple of 4 means the row is corrupt.
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, MinutesError> {
    if bytes.len() % 4 != 0 {
        return Err(MinutesError::Persistence(format!(
            "Embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

// ============================================================================
// Helper functions for row-to-entity conversion.
// ============================================================================

fn row_to_meeting(row: &rusqlite::Row<'_>) -> Result<Meeting, MinutesError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let title: String = row
        .get(1)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let attendees: String = row
        .get(2)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let transcript: String = row
        .get(3)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let summary: String = row
        .get(4)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let action_items_json: String = row
        .get(5)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let decisions_json: String = row
        .get(6)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let duration_secs: f64 = row
        .get(7)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let audio_path: String = row
        .get(8)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let visual_path: Option<String> = row
        .get(9)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let created_at_i64: i64 = row
        .get(10)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;

    Ok(Meeting {
        id: parse_meeting_id(&id_str)?,
        title,
        attendees,
        transcript,
        summary,
        action_items: serde_json::from_str(&action_items_json)?,
        decisions: serde_json::from_str(&decisions_json)?,
        duration_secs,
        audio_path,
        visual_path,
        created_at: Utc
            .timestamp_opt(created_at_i64, 0)
            .single()
            .unwrap_or_default(),
    })
}

fn row_to_overview(row: &rusqlite::Row<'_>) -> Result<MeetingOverview, MinutesError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let title: String = row
        .get(1)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let attendees: String = row
        .get(2)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let summary: String = row
        .get(3)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let duration_secs: f64 = row
        .get(4)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let created_at_i64: i64 = row
        .get(5)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;

    Ok(MeetingOverview {
        id: parse_meeting_id(&id_str)?,
        title,
        attendees,
        summary,
        duration_secs,
        created_at: Utc
            .timestamp_opt(created_at_i64, 0)
            .single()
            .unwrap_or_default(),
    })
}

fn row_to_corpus_chunk(row: &rusqlite::Row<'_>) -> Result<CorpusChunk, MinutesError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let chunk_index: u32 = row
        .get(1)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let text: String = row
        .get(2)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let blob: Vec<u8> = row
        .get(3)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let title: String = row
        .get(4)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;
    let summary: String = row
        .get(5)
        .map_err(|e| MinutesError::Persistence(e.to_string()))?;

    Ok(CorpusChunk {
        meeting_id: parse_meeting_id(&id_str)?,
        chunk_index,
        text,
        embedding: decode_embedding(&blob)?,
        title,
        summary,
    })
}

fn parse_meeting_id(s: &str) -> Result<MeetingId, MinutesError> {
    s.parse::<MeetingId>()
        .map_err(|e| MinutesError::Persistence(format!("Invalid UUID: {}", e)))
}

/// Extension trait for rusqlite to support optional query results.
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
