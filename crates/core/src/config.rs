//! Ingest pipeline configuration.
//!
//! Every component receives its settings through [`MediaConfig`] at
//! construction time. Loading from the environment happens in the API crate.

use std::path::PathBuf;
use std::time::Duration;

/// Default storage directory for committed media.
pub const DEFAULT_STORAGE_DIR: &str = "static/videos";

/// Longest allowed image side in pixels after normalization.
pub const DEFAULT_MAX_IMAGE_SIDE: u32 = 1920;

/// JPEG quality used when re-encoding photos.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Gallery page size.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Name of the encoder binary looked up on `PATH`.
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

/// Number of transcodes allowed to run at the same time.
pub const DEFAULT_MAX_CONCURRENT_TRANSCODES: usize = 2;

/// Settings shared by the ingest coordinator, store, and paginator.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Flat directory holding committed media files.
    pub storage_dir: PathBuf,
    /// Directory for temp artifacts (`None` uses the OS temp dir).
    pub temp_dir: Option<PathBuf>,
    /// Longer-side cap applied to normalized photos.
    pub max_image_side: u32,
    /// JPEG quality (1-100) for normalized photos.
    pub jpeg_quality: u8,
    /// Items per gallery page.
    pub page_size: usize,
    /// Encoder executable (name on `PATH` or absolute path).
    pub ffmpeg_bin: PathBuf,
    /// Optional wall-clock limit for one transcode. `None` waits indefinitely.
    pub transcode_timeout_secs: Option<u64>,
    /// Upper bound on simultaneous transcodes.
    pub max_concurrent_transcodes: usize,
}

impl MediaConfig {
    /// Build a config rooted at `storage_dir` with all other settings at
    /// their defaults.
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    /// Directory where temp artifacts are created.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn transcode_timeout(&self) -> Option<Duration> {
        self.transcode_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            temp_dir: None,
            max_image_side: DEFAULT_MAX_IMAGE_SIDE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            page_size: DEFAULT_PAGE_SIZE,
            ffmpeg_bin: PathBuf::from(DEFAULT_FFMPEG_BIN),
            transcode_timeout_secs: None,
            max_concurrent_transcodes: DEFAULT_MAX_CONCURRENT_TRANSCODES,
        }
    }
}
