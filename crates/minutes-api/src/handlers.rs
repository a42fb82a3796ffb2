//! Route handler functions for all API endpoints.
//!
//! Each handler extracts parameters via axum extractors, interacts with
//! AppState services, and returns JSON responses.

use std::sync::Arc;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use minutes_analysis::build_training_examples;
use minutes_core::types::{Meeting, MeetingId, MeetingOverview, RankedChunk};
use minutes_pipeline::UploadRequest;
use minutes_storage::{AnalyticsSummary, MeetingRepository, TrainingExampleRepository};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub k: Option<usize>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub meeting_id: MeetingId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingDataResponse {
    pub examples_created: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_meetings: u64,
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /meetings - run one uploaded recording through the full pipeline.
///
/// Multipart fields: `audio_file` (required, must carry a filename), `title`,
/// `attendees`. A missing or blank title becomes "Untitled Meeting". Responds
/// 201 with the new meeting id once every stage has finished, so a success
/// means the meeting is stored and searchable.
pub async fn upload_meeting(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut title = None;
    let mut attendees = None;
    let mut audio = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.is_empty() {
                    return Err(ApiError::BadRequest(
                        "Field 'audio_file' must carry a filename".to_string(),
                    ));
                }
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read field 'audio_file': {}", e))
                })?;
                audio = Some((file_name, bytes.to_vec()));
            }
            "title" => title = Some(text_field(field).await?),
            "attendees" => attendees = Some(text_field(field).await?),
            _ => {}
        }
    }

    let (file_name, audio) =
        audio.ok_or_else(|| ApiError::BadRequest("Field 'audio_file' is required".to_string()))?;
    let title = match title {
        Some(t) if !t.trim().is_empty() => t,
        _ => "Untitled Meeting".to_string(),
    };

    let meeting_id = state
        .pipeline
        .process_upload(UploadRequest {
            title,
            attendees: attendees.unwrap_or_default(),
            file_name,
            audio,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse { meeting_id })))
}

async fn text_field(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart field: {}", e)))
}

/// GET /meetings - all meetings as overviews, most recent first.
pub async fn list_meetings(
    State(state): State<AppState>,
) -> Result<Json<Vec<MeetingOverview>>, ApiError> {
    let repo = MeetingRepository::new(Arc::clone(&state.database));
    let meetings = repo.list_recent().map_err(ApiError::from)?;
    Ok(Json(meetings))
}

/// GET /meetings/{id} - one full meeting record.
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Meeting>, ApiError> {
    let id = id
        .parse::<MeetingId>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid meeting id '{}'", id)))?;

    let repo = MeetingRepository::new(Arc::clone(&state.database));
    let meeting = repo
        .find_by_id(id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("Meeting {} not found", id)))?;

    Ok(Json(meeting))
}

/// POST /search - semantic search across all indexed meetings.
///
/// `k` caps the number of results and falls back to the configured default.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<RankedChunk>>, ApiError> {
    let query = request.query.unwrap_or_default();
    let results = state.search.search(&query, request.k).await?;
    Ok(Json(results))
}

/// GET /analytics - aggregate counters over the stored corpus.
pub async fn analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let repo = MeetingRepository::new(Arc::clone(&state.database));
    let summary = repo.analytics().map_err(ApiError::from)?;
    Ok(Json(summary))
}

/// POST /training-data - derive fine-tuning examples from all stored meetings.
///
/// Walks every meeting, builds prompt/completion pairs for summarization and
/// extraction, and stores the whole batch in one transaction. Meetings with
/// an empty summary or no action items contribute fewer pairs.
pub async fn create_training_data(
    State(state): State<AppState>,
) -> Result<Json<TrainingDataResponse>, ApiError> {
    let meetings = MeetingRepository::new(Arc::clone(&state.database))
        .all()
        .map_err(ApiError::from)?;

    let mut examples = Vec::new();
    for meeting in &meetings {
        examples.extend(build_training_examples(meeting).map_err(ApiError::from)?);
    }

    let created = TrainingExampleRepository::new(Arc::clone(&state.database))
        .insert_batch(&examples)
        .map_err(ApiError::from)?;

    Ok(Json(TrainingDataResponse {
        examples_created: created,
    }))
}

/// GET /health - liveness check with basic counters.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let total_meetings = MeetingRepository::new(Arc::clone(&state.database))
        .count()
        .unwrap_or(0);

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: "0.1.0".to_string(),
        total_meetings,
    }))
}
