/// Domain errors for the ingest pipeline and media store.
///
/// `UnsupportedImage` never reaches the API layer: the ingest coordinator
/// absorbs it through the photo fallback path.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Storage I/O failed while {context}: {source}")]
    StorageIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Media not found: {0}")]
    NotFound(String),

    #[error("Invalid media name: {0}")]
    InvalidName(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap an I/O error with a short description of the failed step.
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::StorageIo {
            context: context.into(),
            source,
        }
    }
}
