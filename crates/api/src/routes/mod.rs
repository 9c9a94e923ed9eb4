pub mod health;
pub mod media;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /media                  GET    gallery page (?page=N)
/// /media/{name}           DELETE remove one media file
/// ```
///
/// Uploads live in [`upload_routes`].
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(media::router())
}

/// Build the `/api/v1` upload routes.
///
/// ```text
/// /upload                 POST   video upload
/// /upload-photo           POST   photo upload
/// ```
pub fn upload_routes() -> Router<AppState> {
    media::upload_router()
}
