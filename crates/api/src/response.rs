//! Shared response envelope types for API handlers.
//!
//! Upload and delete endpoints answer with a `success` flag that the capture
//! page checks directly. Listing endpoints use the `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Result of a video or photo upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    /// Set when the upload succeeded through a fallback path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Result of a delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}
