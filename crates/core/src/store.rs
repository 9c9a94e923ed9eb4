//! Directory-backed media store.
//!
//! The storage directory is the index: every regular, non-hidden file with a
//! recognized extension is a [`MediaItem`]. Writers never expose partial
//! files. New content is written to a hidden `.part` staging file inside the
//! directory and published with an atomic no-clobber link as the final step.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::CoreError;
use crate::naming::candidate_name;

/// Recognized video extensions (lowercase).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

/// Recognized image extensions (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// How many suffixed names to try before giving up on a commit.
const MAX_COMMIT_ATTEMPTS: u32 = 1000;

const STAGING_PREFIX: &str = ".staging-";
const STAGING_SUFFIX: &str = ".part";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Media classification derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl MediaKind {
    /// Classify a filename by its extension, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return Self::Unknown;
        };
        let ext = ext.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Unknown => "unknown",
        }
    }
}

/// A committed media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    /// Filename, also the public identifier.
    pub name: String,
    pub kind: MediaKind,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

/// Check that `name` refers to a direct child of the store directory.
///
/// Rejects empty names, `.`/`..`, hidden names (which covers staging files),
/// path separators and NUL bytes.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || Path::new(name).components().count() != 1;

    if invalid {
        Err(CoreError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Handle to the flat storage directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::storage(format!("creating {}", self.root.display()), e))
    }

    /// Resolve a validated media name to its path.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, CoreError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Scan the directory and return every recognized media file.
    ///
    /// A missing directory yields an empty list. Entries that disappear
    /// mid-scan are skipped.
    pub async fn enumerate(&self) -> Result<Vec<MediaItem>, CoreError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::storage("listing media directory", e)),
        };

        let mut items = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| CoreError::storage("listing media directory", e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let kind = MediaKind::from_name(&name);
            if kind == MediaKind::Unknown {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!(file = %name, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| DateTime::<Utc>::from(std::time::UNIX_EPOCH));

            items.push(MediaItem {
                name,
                kind,
                modified_at,
                size_bytes: metadata.len(),
            });
        }

        Ok(items)
    }

    /// Remove a committed media file.
    ///
    /// Fails with [`CoreError::InvalidName`] for traversal attempts and
    /// [`CoreError::NotFound`] when no such media file exists.
    pub async fn delete(&self, name: &str) -> Result<(), CoreError> {
        let path = self.path_of(name)?;
        let kind = MediaKind::from_name(name);
        if kind == MediaKind::Unknown {
            return Err(CoreError::NotFound(name.to_string()));
        }

        match tokio::fs::symlink_metadata(&path).await {
            Ok(m) if !m.is_dir() => {}
            Ok(_) => return Err(CoreError::NotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::NotFound(name.to_string()))
            }
            Err(e) => return Err(CoreError::storage(format!("inspecting {name}"), e)),
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(file = %name, kind = kind.as_str(), "Deleted media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(CoreError::storage(format!("deleting {name}"), e)),
        }
    }

    /// Create a hidden staging file inside the store directory.
    ///
    /// The file is removed when dropped unless it is committed.
    pub fn staging_file(&self) -> Result<NamedTempFile, CoreError> {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.root)
            .map_err(|e| CoreError::storage("creating staging file", e))
    }

    /// Publish a fully written staging file as `{base}.{ext}`.
    ///
    /// Never overwrites: if the name is taken, `_1`, `_2`, ... are tried in
    /// turn. Returns the committed filename. Blocking.
    pub fn commit_staged(
        &self,
        staged: NamedTempFile,
        base: &str,
        ext: &str,
    ) -> Result<String, CoreError> {
        staged
            .as_file()
            .sync_all()
            .map_err(|e| CoreError::storage("flushing staged file", e))?;

        let mut staged = staged;
        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let name = candidate_name(base, ext, attempt);
            match staged.persist_noclobber(self.root.join(&name)) {
                Ok(_) => {
                    sync_dir(&self.root);
                    return Ok(name);
                }
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::debug!(file = %name, "Name taken, trying next suffix");
                    staged = e.file;
                }
                Err(e) => return Err(CoreError::storage(format!("committing {name}"), e.error)),
            }
        }

        Err(CoreError::storage(
            format!("committing {base}.{ext}"),
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free filename after collision retries",
            ),
        ))
    }

    /// Write `bytes` to the store as `{base}.{ext}` in one atomic commit.
    pub async fn commit_bytes(
        &self,
        base: String,
        ext: &'static str,
        bytes: Vec<u8>,
    ) -> Result<String, CoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut staged = store.staging_file()?;
            staged
                .write_all(&bytes)
                .map_err(|e| CoreError::storage("writing staged file", e))?;
            store.commit_staged(staged, &base, ext)
        })
        .await
        .map_err(|e| CoreError::Internal(format!("commit task failed: {e}")))?
    }

    /// Copy the file at `source` into the store as `{base}.{ext}`.
    pub async fn commit_copy(
        &self,
        source: PathBuf,
        base: String,
        ext: &'static str,
    ) -> Result<String, CoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let staged = store.staging_file()?;
            std::fs::copy(&source, staged.path())
                .map_err(|e| CoreError::storage("copying into staged file", e))?;
            store.commit_staged(staged, &base, ext)
        })
        .await
        .map_err(|e| CoreError::Internal(format!("commit task failed: {e}")))?
    }

    /// Async wrapper around [`MediaStore::commit_staged`].
    pub async fn commit_file(
        &self,
        staged: NamedTempFile,
        base: String,
        ext: &'static str,
    ) -> Result<String, CoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.commit_staged(staged, &base, ext))
            .await
            .map_err(|e| CoreError::Internal(format!("commit task failed: {e}")))?
    }
}

/// Best-effort fsync of the directory so the new entry survives a crash.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = std::fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn store() -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());
        (dir, store)
    }

    fn names(items: &[MediaItem]) -> Vec<String> {
        let mut names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
        names.sort();
        names
    }

    // -- classification ------------------------------------------------------

    #[test]
    fn classifies_by_extension() {
        assert_eq!(MediaKind::from_name("a.mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_name("a.WEBM"), MediaKind::Video);
        assert_eq!(MediaKind::from_name("a.ogg"), MediaKind::Video);
        assert_eq!(MediaKind::from_name("a.jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_name("a.Gif"), MediaKind::Image);
        assert_eq!(MediaKind::from_name("a.txt"), MediaKind::Unknown);
        assert_eq!(MediaKind::from_name("noext"), MediaKind::Unknown);
    }

    // -- validation ----------------------------------------------------------

    #[test]
    fn rejects_traversal_names() {
        for bad in ["", ".", "..", "../x.mp4", "a/b.mp4", "a\\b.mp4", ".hidden.mp4", "x\0.mp4"] {
            assert_matches!(validate_name(bad), Err(CoreError::InvalidName(_)), "{bad:?}");
        }
    }

    #[test]
    fn accepts_plain_names() {
        assert!(validate_name("video_20250101_120000.mp4").is_ok());
        assert!(validate_name("photo with space.jpg").is_ok());
    }

    // -- enumerate -----------------------------------------------------------

    #[tokio::test]
    async fn enumerate_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("nope"));
        assert!(store.enumerate().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enumerate_skips_unknown_hidden_and_dirs() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("a.mp4"), b"v").unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"img").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join(".staging-abc.part"), b"x").unwrap();
        std::fs::write(dir.path().join(".hidden.mp4"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let items = store.enumerate().await.unwrap();

        assert_eq!(names(&items), vec!["a.mp4", "b.jpg"]);
        let image = items.iter().find(|i| i.name == "b.jpg").unwrap();
        assert_eq!(image.kind, MediaKind::Image);
        assert_eq!(image.size_bytes, 3);
    }

    // -- delete --------------------------------------------------------------

    #[tokio::test]
    async fn delete_removes_file() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("a.webm"), b"v").unwrap();

        store.delete("a.webm").await.unwrap();

        assert!(!dir.path().join("a.webm").exists());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_dir, store) = store();
        assert_matches!(store.delete("gone.mp4").await, Err(CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_non_media_is_not_found() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert_matches!(store.delete("notes.txt").await, Err(CoreError::NotFound(_)));
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn delete_traversal_leaves_store_untouched() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("media");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("victim.mp4"), b"keep").unwrap();
        std::fs::write(root.join("a.mp4"), b"v").unwrap();
        let store = MediaStore::new(&root);

        assert_matches!(
            store.delete("../victim.mp4").await,
            Err(CoreError::InvalidName(_))
        );
        assert!(outer.path().join("victim.mp4").exists());
        assert_eq!(names(&store.enumerate().await.unwrap()), vec!["a.mp4"]);
    }

    // -- commit --------------------------------------------------------------

    #[tokio::test]
    async fn commit_bytes_writes_final_name() {
        let (dir, store) = store();

        let name = store
            .commit_bytes("photo_20250101_000000".into(), "jpg", b"jpeg".to_vec())
            .await
            .unwrap();

        assert_eq!(name, "photo_20250101_000000.jpg");
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn commit_never_overwrites() {
        let (dir, store) = store();
        let base = "video_20250101_000000".to_string();

        let first = store.commit_bytes(base.clone(), "mp4", b"one".to_vec()).await.unwrap();
        let second = store.commit_bytes(base.clone(), "mp4", b"two".to_vec()).await.unwrap();
        let third = store.commit_bytes(base, "mp4", b"three".to_vec()).await.unwrap();

        assert_eq!(first, "video_20250101_000000.mp4");
        assert_eq!(second, "video_20250101_000000_1.mp4");
        assert_eq!(third, "video_20250101_000000_2.mp4");
        assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.path().join(&second)).unwrap(), b"two");
    }

    #[tokio::test]
    async fn commit_leaves_no_staging_files() {
        let (dir, store) = store();
        store
            .commit_bytes("photo_x".into(), "jpg", b"data".to_vec())
            .await
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn commit_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("missing"));

        assert_matches!(
            store.commit_bytes("photo_x".into(), "jpg", b"data".to_vec()).await,
            Err(CoreError::StorageIo { .. })
        );
    }

    #[test]
    fn dropped_staging_file_is_removed() {
        let (dir, store) = store();
        let staged = store.staging_file().unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.starts_with(dir.path()));
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn round_trip_restores_listing() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("existing.jpg"), b"x").unwrap();
        let before = names(&store.enumerate().await.unwrap());

        let name = store
            .commit_bytes("video_rt".into(), "webm", b"vid".to_vec())
            .await
            .unwrap();
        assert!(names(&store.enumerate().await.unwrap()).contains(&name));

        store.delete(&name).await.unwrap();
        assert_eq!(names(&store.enumerate().await.unwrap()), before);
    }
}
