//! Route definitions for uploads and the `/media` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

/// Gallery routes, mounted under `/api/v1`.
///
/// ```text
/// GET    /media             -> list_media   (?page=N)
/// DELETE /media/{name}      -> delete_media
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media", get(media::list_media))
        .route("/media/{name}", delete(media::delete_media))
}

/// Upload routes, mounted under `/api/v1`.
///
/// Kept apart from [`router`] so the request timeout never wraps an ingest.
///
/// ```text
/// POST   /upload            -> upload_video
/// POST   /upload-photo      -> upload_photo
/// ```
pub fn upload_router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(media::upload_video))
        .route("/upload-photo", post(media::upload_photo))
}
