//! Minutes application binary - composition root.
//!
//! Ties together all Minutes crates into a single executable:
//! 1. Load configuration from TOML (with CLI and env overrides)
//! 2. Initialize storage (SQLite + artifact directories)
//! 3. Build the OpenAI client and the ingestion pipeline
//! 4. Start the axum REST API server

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use minutes_analysis::{ContentAnalyzer, VisualSynthesizer};
use minutes_api::routes;
use minutes_api::state::AppState;
use minutes_core::config::MinutesConfig;
use minutes_openai::OpenAiClient;
use minutes_pipeline::MeetingPipeline;
use minutes_search::{Chunker, EmbeddingIndexer, SearchEngine};
use minutes_storage::{ArtifactStore, ChunkRepository, Database};

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing.
    let default_level = args
        .resolve_log_level()
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Starting Minutes v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = MinutesConfig::load_or_default(&config_file);
    config.general.port = args.resolve_port(config.general.port);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("minutes.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let artifacts = ArtifactStore::new(&data_dir);

    // OpenAI client. Every capability call (transcription, chat, embeddings,
    // images) goes through this one client.
    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            tracing::error!("OPENAI_API_KEY is not set; uploads cannot be processed");
            return Err("OPENAI_API_KEY is not set".into());
        }
    };
    let client = OpenAiClient::new(&config.openai, api_key, config.index.embedding_dim)?;
    tracing::info!(api_base = %config.openai.api_base, "OpenAI client ready");

    // Ingestion pipeline.
    let analyzer = ContentAnalyzer::new(client.clone(), config.analysis.max_input_chars);
    let visuals = VisualSynthesizer::new(
        client.clone(),
        artifacts.clone(),
        config.analysis.visual_prompt_chars,
    );
    let indexer = EmbeddingIndexer::new(Chunker::new(config.index.chunk_size), client.clone());
    let pipeline = MeetingPipeline::new(
        client.clone(),
        analyzer,
        visuals,
        indexer,
        Arc::clone(&db),
        artifacts,
        config.upload.allowed_extensions.clone(),
    );
    tracing::info!("Ingestion pipeline ready");

    // Search engine over the stored corpus.
    let engine = SearchEngine::new(
        ChunkRepository::new(Arc::clone(&db)),
        client,
        config.search.top_k,
    );

    let state = AppState::new(config, db, pipeline, engine);

    routes::start_server(state).await?;

    Ok(())
}
