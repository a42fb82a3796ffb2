//! Database schema migrations.
//!
//! Applies the initial schema including the meetings, meeting_chunks,
//! training_examples, and schema_migrations tables.

use rusqlite::Connection;
use tracing::info;

use minutes_core::error::MinutesError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), MinutesError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| MinutesError::Persistence(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| MinutesError::Persistence(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), MinutesError> {
    conn.execute_batch(
        "
        -- Processed meeting records. Written once per pipeline run,
        -- never updated.
        CREATE TABLE IF NOT EXISTS meetings (
            id              TEXT PRIMARY KEY NOT NULL,
            title           TEXT NOT NULL,
            attendees       TEXT NOT NULL DEFAULT '',
            transcript      TEXT NOT NULL DEFAULT '',
            summary         TEXT NOT NULL DEFAULT '',
            action_items    TEXT NOT NULL DEFAULT '[]',
            decisions       TEXT NOT NULL DEFAULT '[]',
            duration_secs   REAL NOT NULL DEFAULT 0
                            CHECK (duration_secs >= 0),
            audio_path      TEXT NOT NULL DEFAULT '',
            visual_path     TEXT,
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_meetings_created_at
            ON meetings (created_at DESC);

        -- Embedded transcript chunks, the search corpus. Vectors are
        -- little-endian f32 bytes, fixed corpus-wide dimension.
        CREATE TABLE IF NOT EXISTS meeting_chunks (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            meeting_id      TEXT NOT NULL,
            chunk_index     INTEGER NOT NULL
                            CHECK (chunk_index >= 0),
            text            TEXT NOT NULL,
            embedding       BLOB NOT NULL,
            UNIQUE (meeting_id, chunk_index),
            FOREIGN KEY (meeting_id) REFERENCES meetings(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_meeting
            ON meeting_chunks (meeting_id, chunk_index ASC);

        -- Prompt/completion pairs derived from meetings for model tuning.
        CREATE TABLE IF NOT EXISTS training_examples (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            prompt          TEXT NOT NULL,
            completion      TEXT NOT NULL,
            meeting_id      TEXT NOT NULL,
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY (meeting_id) REFERENCES meetings(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_training_meeting
            ON training_examples (meeting_id);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| MinutesError::Persistence(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    #[test]
    fn test_migrations_run_once() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        // Running again should be idempotent.
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_meetings_table_exists() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO meetings (id, title, transcript, summary)
             VALUES ('m-1', 'Standup', 'we talked', 'talked')",
            [],
        )
        .unwrap();

        let title: String = conn
            .query_row("SELECT title FROM meetings WHERE id = 'm-1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(title, "Standup");
    }

    #[test]
    fn test_chunks_require_existing_meeting() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO meeting_chunks (meeting_id, chunk_index, text, embedding)
             VALUES ('missing', 0, 'orphan', x'00000000')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_chunk_index_unique_per_meeting() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO meetings (id, title) VALUES ('m-1', 'Standup')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO meeting_chunks (meeting_id, chunk_index, text, embedding)
             VALUES ('m-1', 0, 'first', x'00000000')",
            [],
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO meeting_chunks (meeting_id, chunk_index, text, embedding)
             VALUES ('m-1', 0, 'again', x'00000000')",
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_negative_duration_rejected() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO meetings (id, title, duration_secs) VALUES ('m-1', 'Bad', -5.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_training_examples_table_exists() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO meetings (id, title) VALUES ('m-1', 'Standup')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO training_examples (prompt, completion, meeting_id)
             VALUES ('Summarize: ...', 'A summary.', 'm-1')",
            [],
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM training_examples", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_deleting_meeting_cascades_to_chunks() {
        let conn = open_test_conn();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO meetings (id, title) VALUES ('m-1', 'Standup')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO meeting_chunks (meeting_id, chunk_index, text, embedding)
             VALUES ('m-1', 0, 'chunk', x'00000000')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM meetings WHERE id = 'm-1'", [])
            .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM meeting_chunks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
