//! Shared application state for route handlers.

use std::sync::Arc;

use minutes_core::config::MinutesConfig;
use minutes_pipeline::MeetingPipeline;
use minutes_search::SearchEngine;
use minutes_storage::Database;

/// Shared application state passed to all route handlers.
///
/// Cloned per request by axum; every field is behind an Arc. Handlers build
/// repositories from the shared database handle as needed.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, fixed at startup.
    pub config: Arc<MinutesConfig>,
    /// Shared SQLite handle.
    pub database: Arc<Database>,
    /// Ingestion pipeline that turns uploads into indexed meetings.
    pub pipeline: Arc<MeetingPipeline>,
    /// Semantic search over the indexed corpus.
    pub search: Arc<SearchEngine>,
}

impl AppState {
    pub fn new(
        config: MinutesConfig,
        database: Arc<Database>,
        pipeline: MeetingPipeline,
        search: SearchEngine,
    ) -> Self {
        Self {
            config: Arc::new(config),
            database,
            pipeline: Arc::new(pipeline),
            search: Arc::new(search),
        }
    }
}
