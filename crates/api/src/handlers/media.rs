//! Handlers for uploads, the gallery listing, and deletion.
//!
//! Upload handlers await the whole ingest (including any transcode) before
//! responding; there is no background queue. The ingest itself runs on its
//! own task, so a client disconnect cannot abort it halfway.

use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use snapbox_core::error::CoreError;
use snapbox_core::gallery::{paginate, PageResult};
use snapbox_core::ingest::{IngestOutcome, VIDEO_FALLBACK_WARNING};

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::{DataResponse, DeleteResponse, UploadResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of a video upload: `{ "video": "data:video/webm;base64,..." }`.
#[derive(Debug, Deserialize)]
pub struct UploadVideoRequest {
    pub video: String,
}

/// Body of a photo upload: `{ "photo": "data:image/png;base64,..." }`.
#[derive(Debug, Deserialize)]
pub struct UploadPhotoRequest {
    pub photo: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/upload
///
/// Store a recorded video. A transcode failure still succeeds, with a
/// `warning` and the untranscoded file.
pub async fn upload_video(
    State(state): State<AppState>,
    body: Result<Json<UploadVideoRequest>, JsonRejection>,
) -> AppResult<Json<UploadResponse>> {
    let Json(body) = body?;
    let ingestor = Arc::clone(&state.ingestor);
    let outcome =
        run_to_completion(async move { ingestor.ingest_video(&body.video).await }).await?;

    Ok(Json(UploadResponse {
        success: true,
        filename: outcome.filename,
        warning: outcome.fallback.then(|| VIDEO_FALLBACK_WARNING.to_string()),
    }))
}

/// POST /api/v1/upload-photo
///
/// Store a captured photo, normalized to JPEG when it can be decoded.
pub async fn upload_photo(
    State(state): State<AppState>,
    body: Result<Json<UploadPhotoRequest>, JsonRejection>,
) -> AppResult<Json<UploadResponse>> {
    let Json(body) = body?;
    let ingestor = Arc::clone(&state.ingestor);
    let outcome =
        run_to_completion(async move { ingestor.ingest_photo(&body.photo).await }).await?;

    Ok(Json(UploadResponse {
        success: true,
        filename: outcome.filename,
        warning: None,
    }))
}

/// GET /api/v1/media?page=N
///
/// List committed media, newest first, one page at a time.
pub async fn list_media(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<PageResult>>> {
    let Query(params) = params?;
    let items = state.ingestor.store().enumerate().await?;
    let page = paginate(
        items,
        params.page.unwrap_or(1),
        state.ingestor.config().page_size,
    );
    Ok(Json(DataResponse { data: page }))
}

/// DELETE /api/v1/media/{name}
///
/// The path segment arrives percent-decoded; traversal attempts are
/// rejected before touching the filesystem.
pub async fn delete_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Media name must not be empty".into()));
    }
    state.ingestor.store().delete(&name).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run an ingest on a spawned task and wait for it.
///
/// Dropping the returned future (client gone, server shutting down) leaves the
/// task running until its commit or fallback is done.
async fn run_to_completion<F>(ingest: F) -> AppResult<IngestOutcome>
where
    F: Future<Output = Result<IngestOutcome, CoreError>> + Send + 'static,
{
    let outcome = tokio::spawn(ingest)
        .await
        .map_err(|e| AppError::InternalError(format!("ingest task failed: {e}")))??;
    Ok(outcome)
}
