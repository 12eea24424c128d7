use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tokio::fs;

/// Opaque reference to materialized media; valid while its [`MediaStore`]
/// is alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaHandle(PathBuf);

impl MediaHandle {
    pub fn path(&self) -> &Path {
        &self.0
    }

    pub async fn is_available(&self) -> bool {
        fs::metadata(&self.0).await.map(|m| m.is_file()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "wav",
        }
    }
}

/// Session-scoped scratch directory backing every handle handed out.
/// Dropping the store removes the files, which expires the handles.
#[derive(Debug)]
pub struct MediaStore {
    dir: TempDir,
    counter: AtomicU64,
}

impl MediaStore {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("webvidgen-media-")
            .tempdir()
            .context("Failed to create media scratch directory")?;
        Ok(Self {
            dir,
            counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub async fn materialize(&self, kind: MediaKind, bytes: &[u8]) -> Result<MediaHandle> {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            seq,
            kind.extension()
        );
        let path = self.dir.path().join(name);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write media: {}", path.display()))?;
        Ok(MediaHandle(path))
    }
}

/// Download name for the clip a host is currently previewing.
pub fn preview_file_name(now_millis: i64) -> String {
    format!("webvidgen-preview-{}.mp4", now_millis)
}

/// Copies a handle's payload into `dest_dir` under `file_name`.
pub async fn export(handle: &MediaHandle, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("Failed to create dir {}", dest_dir.display()))?;
    let dest = dest_dir.join(file_name);
    fs::copy(handle.path(), &dest)
        .await
        .with_context(|| format!("Failed to export {} -> {}", handle.path().display(), dest.display()))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handles_expire_with_their_store() {
        let store = MediaStore::new().unwrap();
        let a = store.materialize(MediaKind::Video, b"mp4-bytes").await.unwrap();
        let b = store.materialize(MediaKind::Audio, b"wav-bytes").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(a.path().extension().unwrap(), "mp4");
        assert_eq!(b.path().extension().unwrap(), "wav");
        assert!(a.is_available().await);

        drop(store);
        assert!(!a.is_available().await);
    }

    #[tokio::test]
    async fn export_copies_under_the_given_name() {
        let store = MediaStore::new().unwrap();
        let handle = store.materialize(MediaKind::Video, b"clip").await.unwrap();
        let out = tempfile::tempdir().unwrap();

        let dest = export(&handle, &out.path().join("nested"), "webvidgen-42.mp4")
            .await
            .unwrap();
        assert_eq!(fs::read(&dest).await.unwrap(), b"clip");
        assert_eq!(preview_file_name(17), "webvidgen-preview-17.mp4");
    }
}
