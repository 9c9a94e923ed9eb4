//! Ingest coordinator: decode, stage, normalize or transcode, commit.
//!
//! Every intermediate file is a [`NamedTempFile`], so it is removed on every
//! exit path including early `?` returns. The commit into the store is always
//! the last filesystem action of an ingest.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tokio::sync::Semaphore;

use crate::config::MediaConfig;
use crate::error::CoreError;
use crate::ffmpeg::{FfmpegTranscoder, Transcoder};
use crate::imaging::normalize_image;
use crate::naming::{base_name_now, PHOTO_PREFIX, VIDEO_PREFIX};
use crate::payload::decode_data_url;
use crate::store::MediaStore;

/// Extension of a cleanly transcoded video.
pub const TRANSCODED_EXTENSION: &str = "mp4";

/// Extension of a recording stored untranscoded, whatever its declared MIME.
pub const FALLBACK_VIDEO_EXTENSION: &str = "webm";

/// Extension of every committed photo.
pub const PHOTO_EXTENSION: &str = "jpg";

/// Warning reported to clients when the untranscoded source was kept.
pub const VIDEO_FALLBACK_WARNING: &str =
    "Video transcoding failed; the original recording was saved without conversion";

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Committed filename in the store.
    pub filename: String,
    /// `true` when the preferred normalization/transcode step failed and the
    /// raw bytes were stored instead.
    pub fallback: bool,
}

/// Orchestrates the upload pipeline for videos and photos.
pub struct Ingestor<T = FfmpegTranscoder> {
    config: MediaConfig,
    store: MediaStore,
    transcoder: T,
    transcode_slots: Semaphore,
}

impl Ingestor<FfmpegTranscoder> {
    /// Build an ingestor that shells out to the configured `ffmpeg`.
    pub fn from_config(config: MediaConfig) -> Self {
        let transcoder =
            FfmpegTranscoder::new(config.ffmpeg_bin.clone(), config.transcode_timeout());
        let store = MediaStore::new(config.storage_dir.clone());
        Self::new(config, store, transcoder)
    }
}

impl<T: Transcoder> Ingestor<T> {
    pub fn new(config: MediaConfig, store: MediaStore, transcoder: T) -> Self {
        let slots = config.max_concurrent_transcodes.max(1);
        Self {
            config,
            store,
            transcoder,
            transcode_slots: Semaphore::new(slots),
        }
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Ingest a recorded video.
    ///
    /// Commits `{base}.mp4` when the transcoder succeeds, otherwise the raw
    /// recording as `{base}.webm` with `fallback = true`.
    pub async fn ingest_video(&self, payload: &str) -> Result<IngestOutcome, CoreError> {
        let decoded = decode_data_url(payload)?;
        let mime = decoded.mime.unwrap_or_default();
        let size = decoded.bytes.len();

        let artifact = write_temp_artifact(self.config.temp_dir(), decoded.bytes).await?;
        let base = base_name_now(VIDEO_PREFIX);

        let staged = self.store.staging_file()?;
        let transcoded = {
            let _permit = self
                .transcode_slots
                .acquire()
                .await
                .map_err(|_| CoreError::Internal("transcode slots closed".into()))?;
            self.transcoder
                .transcode(artifact.path(), staged.path())
                .await
        };

        let outcome = if transcoded {
            let filename = self
                .store
                .commit_file(staged, base, TRANSCODED_EXTENSION)
                .await?;
            IngestOutcome {
                filename,
                fallback: false,
            }
        } else {
            drop(staged);
            let filename = self
                .store
                .commit_copy(artifact.path().to_path_buf(), base, FALLBACK_VIDEO_EXTENSION)
                .await?;
            tracing::warn!(file = %filename, "Stored untranscoded video after transcode failure");
            IngestOutcome {
                filename,
                fallback: true,
            }
        };

        remove_temp_artifact(artifact);
        tracing::info!(
            file = %outcome.filename,
            bytes = size,
            %mime,
            fallback = outcome.fallback,
            "Video ingested"
        );
        Ok(outcome)
    }

    /// Ingest a captured photo.
    ///
    /// The photo is normalized to JPEG; undecodable input is stored verbatim
    /// under the `.jpg` name with `fallback = true`.
    pub async fn ingest_photo(&self, payload: &str) -> Result<IngestOutcome, CoreError> {
        let decoded = decode_data_url(payload)?;
        let max_side = self.config.max_image_side;
        let quality = self.config.jpeg_quality;

        let (bytes, fallback) = tokio::task::spawn_blocking(move || {
            match normalize_image(&decoded.bytes, max_side, quality) {
                Ok(jpeg) => (jpeg, false),
                Err(e) => {
                    tracing::warn!(error = %e, "Photo normalization failed, storing original bytes");
                    (decoded.bytes, true)
                }
            }
        })
        .await
        .map_err(|e| CoreError::Internal(format!("normalize task failed: {e}")))?;

        let size = bytes.len();
        let base = base_name_now(PHOTO_PREFIX);
        let filename = self.store.commit_bytes(base, PHOTO_EXTENSION, bytes).await?;

        tracing::info!(file = %filename, bytes = size, fallback, "Photo ingested");
        Ok(IngestOutcome { filename, fallback })
    }
}

/// Write raw upload bytes to a fresh temp artifact in `dir`.
async fn write_temp_artifact(dir: PathBuf, bytes: Vec<u8>) -> Result<NamedTempFile, CoreError> {
    tokio::task::spawn_blocking(move || {
        let mut artifact = tempfile::Builder::new()
            .prefix("snapbox-upload-")
            .suffix(".raw")
            .tempfile_in(&dir)
            .map_err(|e| CoreError::storage("creating temp artifact", e))?;
        artifact
            .write_all(&bytes)
            .and_then(|()| artifact.flush())
            .map_err(|e| CoreError::storage("writing temp artifact", e))?;
        Ok(artifact)
    })
    .await
    .map_err(|e| CoreError::Internal(format!("temp write task failed: {e}")))?
}

/// Delete the temp artifact, logging instead of failing the ingest.
fn remove_temp_artifact(artifact: NamedTempFile) {
    let path = artifact.path().to_path_buf();
    if let Err(e) = artifact.close() {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp artifact");
    }
}
