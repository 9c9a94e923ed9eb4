use std::path::PathBuf;
use std::str::FromStr;

use snapbox_core::config::MediaConfig;

/// Default request body limit (100 MiB), sized for a few minutes of
/// base64-encoded recording.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Applies to every
    /// route except the uploads, whose ingest always runs to completion.
    pub request_timeout_secs: u64,
    /// Maximum accepted request body in bytes.
    pub max_upload_bytes: usize,
    /// Ingest pipeline settings handed to `snapbox_core`.
    pub media: MediaConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `5000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:5000`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `300`                      |
    /// | `MAX_UPLOAD_BYTES`          | `104857600`                |
    /// | `STORAGE_DIR`               | `static/videos`            |
    /// | `TEMP_DIR`                  | OS temp dir                |
    /// | `MAX_IMAGE_SIDE`            | `1920`                     |
    /// | `JPEG_QUALITY`              | `90`                       |
    /// | `PAGE_SIZE`                 | `30`                       |
    /// | `FFMPEG_BIN`                | `ffmpeg`                   |
    /// | `TRANSCODE_TIMEOUT_SECS`    | unset (no timeout)         |
    /// | `MAX_CONCURRENT_TRANSCODES` | `2`                        |
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", 5000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 300);
        let max_upload_bytes: usize = parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            media: media_config_from_env(),
        }
    }
}

/// Build the ingest pipeline settings from the environment.
fn media_config_from_env() -> MediaConfig {
    let defaults = MediaConfig::default();

    MediaConfig {
        storage_dir: std::env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir),
        temp_dir: std::env::var("TEMP_DIR").ok().map(PathBuf::from),
        max_image_side: parse_env("MAX_IMAGE_SIDE", defaults.max_image_side),
        jpeg_quality: parse_env("JPEG_QUALITY", defaults.jpeg_quality),
        page_size: parse_env("PAGE_SIZE", defaults.page_size),
        ffmpeg_bin: std::env::var("FFMPEG_BIN")
            .map(PathBuf::from)
            .unwrap_or(defaults.ffmpeg_bin),
        transcode_timeout_secs: std::env::var("TRANSCODE_TIMEOUT_SECS").ok().map(|v| {
            v.parse()
                .unwrap_or_else(|_| panic!("TRANSCODE_TIMEOUT_SECS must be a valid u64, got '{v}'"))
        }),
        max_concurrent_transcodes: parse_env(
            "MAX_CONCURRENT_TRANSCODES",
            defaults.max_concurrent_transcodes,
        ),
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value '{raw}'")),
        Err(_) => default,
    }
}
