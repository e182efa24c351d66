use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::dao::storage::{StorageError, StorageResult};

/// Durable mapping from player display name to cumulative score.
pub trait LeaderboardStore: Send + Sync {
    /// Load the persisted scores, or an empty map when nothing was saved yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<IndexMap<String, u32>>>;
    /// Replace the persisted scores with `scores`.
    fn save(&self, scores: IndexMap<String, u32>) -> BoxFuture<'static, StorageResult<()>>;
}

/// Leaderboard persisted as a flat JSON object (`{"player": score}`).
#[derive(Debug, Clone)]
pub struct JsonLeaderboardStore {
    path: Arc<PathBuf>,
}

impl JsonLeaderboardStore {
    /// Create a store writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "leaderboard".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LeaderboardStore for JsonLeaderboardStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<IndexMap<String, u32>>> {
        let path = self.path.clone();
        Box::pin(async move {
            match tokio::fs::read_to_string(path.as_ref()).await {
                Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                    StorageError::corrupt(
                        format!("failed to parse leaderboard `{}`", path.display()),
                        err,
                    )
                }),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    info!(path = %path.display(), "no leaderboard saved yet; starting empty");
                    Ok(IndexMap::new())
                }
                Err(err) => Err(StorageError::unavailable(
                    format!("failed to read leaderboard `{}`", path.display()),
                    err,
                )),
            }
        })
    }

    fn save(&self, scores: IndexMap<String, u32>) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        let temp = self.temp_path();
        Box::pin(async move {
            let payload = serde_json::to_string_pretty(&scores).map_err(|err| {
                StorageError::corrupt("failed to serialize leaderboard", err)
            })?;
            // Write aside then rename so a crash never leaves a truncated file.
            tokio::fs::write(&temp, payload).await.map_err(|err| {
                StorageError::unavailable(
                    format!("failed to write leaderboard `{}`", temp.display()),
                    err,
                )
            })?;
            tokio::fs::rename(&temp, path.as_ref()).await.map_err(|err| {
                StorageError::unavailable(
                    format!("failed to replace leaderboard `{}`", path.display()),
                    err,
                )
            })?;
            debug!(path = %path.display(), players = scores.len(), "leaderboard saved");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLeaderboardStore::new(dir.path().join("ranking.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_keeps_order_and_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.json");
        let store = JsonLeaderboardStore::new(&path);

        let mut scores = IndexMap::new();
        scores.insert("Zé".to_string(), 10);
        scores.insert("Ana".to_string(), 3);
        store.save(scores.clone()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Zé"));
        assert!(!dir.path().join("ranking.json.tmp").exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, scores);
        assert_eq!(loaded.keys().next().map(String::as_str), Some("Zé"));
    }

    #[tokio::test]
    async fn reads_the_legacy_flat_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.json");
        std::fs::write(&path, "{\n  \"Maria\": 16,\n  \"João\": 1\n}").unwrap();

        let loaded = JsonLeaderboardStore::new(&path).load().await.unwrap();
        assert_eq!(loaded.get("Maria"), Some(&16));
        assert_eq!(loaded.get("João"), Some(&1));
    }

    #[tokio::test]
    async fn garbage_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = JsonLeaderboardStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
