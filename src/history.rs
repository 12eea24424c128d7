use crate::logw;
use crate::model::GeneratedVideo;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

pub const STORAGE_KEY: &str = "webvidgen_history";

/// Durable list of past generations. Records are stored without media
/// handles.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &GeneratedVideo) -> Result<()>;
    async fn remove(&self, id: &str) -> Result<()>;
    async fn load_all(&self) -> Result<Vec<GeneratedVideo>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(rename = "webvidgen_history", default)]
    entries: Vec<GeneratedVideo>,
}

/// Single JSON file holding every record under [`STORAGE_KEY`].
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<HistoryDocument> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HistoryDocument::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read history: {}", self.path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(HistoryDocument::default());
        }
        match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(err) => {
                // An unreadable document is replaced on the next write.
                logw(format!(
                    "Failed to load history {}: {}; starting empty",
                    self.path.display(),
                    err
                ));
                Ok(HistoryDocument::default())
            }
        }
    }

    async fn write(&self, doc: &HistoryDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create dir {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(doc)?;
        let staging = self.staging_path();
        fs::write(&staging, json)
            .await
            .with_context(|| format!("Failed to write history: {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to replace history: {}", self.path.display()))
    }

    /// Sibling file the document is written to before being renamed over
    /// the real one, so readers never see a partial write.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| STORAGE_KEY.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn append(&self, record: &GeneratedVideo) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        doc.entries.retain(|e| e.id != record.id);
        doc.entries.insert(0, record.stripped());
        self.write(&doc).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        let before = doc.entries.len();
        doc.entries.retain(|e| e.id != id);
        if doc.entries.len() == before {
            tracing::debug!("history remove: no entry with id {id}");
            return Ok(());
        }
        self.write(&doc).await
    }

    async fn load_all(&self) -> Result<Vec<GeneratedVideo>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.entries)
    }
}

/// A record as shown in the history list.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub video: GeneratedVideo,
    /// False when the media handle is gone; such entries can only be deleted.
    pub playable: bool,
}

impl HistoryEntry {
    pub fn label(&self) -> &'static str {
        if self.playable { "ready" } else { "link expired" }
    }
}

/// Newest first, with playability resolved against the filesystem.
pub async fn sorted_for_display(records: &[GeneratedVideo]) -> Vec<HistoryEntry> {
    let mut entries = Vec::with_capacity(records.len());
    for video in records {
        let playable = match &video.video_url {
            Some(handle) => handle.is_available().await,
            None => false,
        };
        entries.push(HistoryEntry {
            video: video.clone(),
            playable,
        });
    }
    entries.sort_by(|a, b| b.video.timestamp.cmp(&a.video.timestamp));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaKind, MediaStore};
    use crate::model::{AspectRatio, VideoStatus};

    fn record(id: &str, timestamp: i64) -> GeneratedVideo {
        let mut video = GeneratedVideo::pending("https://example.com", AspectRatio::Landscape);
        video.id = id.to_string();
        video.timestamp = timestamp;
        video.status = VideoStatus::Completed;
        video.duration = Some(6);
        video
    }

    #[tokio::test]
    async fn append_strips_handles_and_prepends() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("h/history.json"));

        let mut first = record("1", 100);
        first.video_url = Some(media.materialize(MediaKind::Video, b"v").await.unwrap());
        first.audio_url = Some(media.materialize(MediaKind::Audio, b"a").await.unwrap());
        first.script = Some("Hello".to_string());
        store.append(&first).await.unwrap();
        store.append(&record("2", 200)).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "2");
        assert!(all[1].video_url.is_none());
        assert!(all[1].audio_url.is_none());
        assert_eq!(all[1].script.as_deref(), Some("Hello"));

        let raw = fs::read_to_string(store.path()).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json[STORAGE_KEY].is_array());
        assert!(json[STORAGE_KEY][1]["videoUrl"].is_null());
    }

    #[tokio::test]
    async fn remove_drops_only_the_matching_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        store.append(&record("a", 1)).await.unwrap();
        store.append(&record("b", 2)).await.unwrap();

        store.remove("a").await.unwrap();
        store.remove("missing").await.unwrap();

        let ids: Vec<String> = store.load_all().await.unwrap().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("none.json"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn truncated_document_loads_empty_and_is_replaced_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"{"webvidgen_history": [ {"id": "#).await.unwrap();
        let store = JsonHistoryStore::new(path.clone());

        assert!(store.load_all().await.unwrap().is_empty());

        store.append(&record("fresh", 5)).await.unwrap();
        let ids: Vec<String> = store.load_all().await.unwrap().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["fresh".to_string()]);
        assert!(!store.staging_path().exists());
    }

    #[tokio::test]
    async fn display_order_and_expired_links() {
        let media = MediaStore::new().unwrap();
        let mut live = record("live", 50);
        live.video_url = Some(media.materialize(MediaKind::Video, b"v").await.unwrap());
        let records = vec![live, record("old", 10), record("new", 90)];

        let entries = sorted_for_display(&records).await;
        let ids: Vec<&str> = entries.iter().map(|e| e.video.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "live", "old"]);
        assert!(entries[1].playable);
        assert_eq!(entries[0].label(), "link expired");
    }
}
