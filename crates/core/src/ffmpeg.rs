//! Video transcoding through an external `ffmpeg` process.
//!
//! [`Transcoder`] is the seam the ingest coordinator depends on. The
//! production implementation, [`FfmpegTranscoder`], converts browser
//! recordings (VP8/VP9 WebM) into H.264/AAC MP4 with the `moov` atom moved to
//! the front so playback can start before the download finishes.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

/// Error type for FFmpeg operations. Never escapes [`FfmpegTranscoder`]:
/// it is logged and collapsed into a `false` result.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg binary could not be launched: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("ffmpeg timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Trait implemented by video transcoders.
///
/// Implementations report success as a boolean and must not panic or return
/// errors for ordinary process failures.
pub trait Transcoder: Send + Sync {
    /// Transcode the file at `input` into a web-optimized MP4 at `output`.
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
    ) -> impl std::future::Future<Output = bool> + Send;
}

/// Maximum number of stderr bytes kept for diagnostics.
const STDERR_TAIL_BYTES: usize = 2048;

/// Runs `ffmpeg` with a fixed web-delivery profile.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Argument list for one transcode, excluding the binary itself.
    ///
    /// `-f mp4` is explicit because the output is a staging file whose name
    /// does not end in `.mp4`.
    pub fn transcode_args(input: &Path, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into(), "-i".into()];
        args.push(input.to_string_lossy().into_owned());
        args.extend(
            [
                "-c:v",
                "libx264",
                "-preset",
                "fast",
                "-crf",
                "22",
                "-c:a",
                "aac",
                "-b:a",
                "128k",
                "-movflags",
                "+faststart",
                "-f",
                "mp4",
            ]
            .map(String::from),
        );
        args.push(output.to_string_lossy().into_owned());
        args
    }

    /// Check whether the configured binary can be launched.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<(), FfmpegError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::transcode_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let child = cmd.spawn().map_err(FfmpegError::NotFound)?;

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| FfmpegError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                })?,
            None => child.wait_with_output().await,
        };
        let out = result?;

        if !out.status.success() {
            return Err(FfmpegError::ExecutionFailed {
                exit_code: out.status.code(),
                stderr: stderr_tail(&out.stderr),
            });
        }

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ffmpeg transcode finished"
        );
        Ok(())
    }
}

impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> bool {
        match self.run(input, output).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    binary = %self.binary.display(),
                    input = %input.display(),
                    "Video transcode failed"
                );
                false
            }
        }
    }
}

/// Keep the last [`STDERR_TAIL_BYTES`] of stderr, where ffmpeg reports the
/// actual failure after its banner.
fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
