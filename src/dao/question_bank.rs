use std::{path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    dao::{
        models::PuzzleEntity,
        storage::{StorageError, StorageResult},
    },
    state::puzzle::Puzzle,
};

/// Read contract of the puzzle source.
pub trait QuestionBank: Send + Sync {
    /// Load every valid puzzle currently in the bank.
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<Puzzle>>>;
}

/// Question bank backed by a JSON array on disk, re-read on every load so
/// edits are picked up at the next round start.
#[derive(Debug, Clone)]
pub struct JsonQuestionBank {
    path: Arc<PathBuf>,
}

impl JsonQuestionBank {
    /// Create a bank reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }
}

impl QuestionBank for JsonQuestionBank {
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<Puzzle>>> {
        let path = self.path.clone();
        Box::pin(async move {
            let contents = tokio::fs::read_to_string(path.as_ref())
                .await
                .map_err(|err| {
                    StorageError::unavailable(
                        format!("failed to read question bank `{}`", path.display()),
                        err,
                    )
                })?;
            let records: Vec<PuzzleEntity> = serde_json::from_str(&contents).map_err(|err| {
                StorageError::corrupt(
                    format!("failed to parse question bank `{}`", path.display()),
                    err,
                )
            })?;
            let puzzles = into_puzzles(records);
            debug!(path = %path.display(), count = puzzles.len(), "question bank loaded");
            Ok(puzzles)
        })
    }
}

/// Validate raw records, skipping the ones that cannot be played.
pub fn into_puzzles(records: Vec<PuzzleEntity>) -> Vec<Puzzle> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match record.validate() {
            Ok(()) => Some(record.into()),
            Err(err) => {
                warn!(index, error = %err, "skipping invalid puzzle record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn loads_valid_records_and_skips_invalid_ones() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"categoria":"Filmes","emoji":"🚢🧊","resposta":"Titanic","dicas":["navio"]}},
                {{"category":"Movies","emoji":"🦁👑","answer":"","hints":[]}},
                {{"category":"Movies","emoji":"🕷️🧑","answer":"Spider-Man","hints":["web"],"decoys":["Batman"]}}
            ]"#
        )
        .unwrap();

        let bank = JsonQuestionBank::new(file.path());
        let puzzles = bank.load().await.unwrap();

        assert_eq!(puzzles.len(), 2);
        assert_eq!(puzzles[0].answer, "Titanic");
        assert_eq!(puzzles[1].decoys, vec!["Batman"]);
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let bank = JsonQuestionBank::new(dir.path().join("missing.json"));
        let err = bank.load().await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_corrupt() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = JsonQuestionBank::new(file.path()).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
