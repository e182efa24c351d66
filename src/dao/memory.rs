//! In-process storage collaborators, used when embedding the game without
//! files and by the test suites.

use std::{
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::{
    dao::{
        leaderboard_store::LeaderboardStore,
        question_bank::QuestionBank,
        storage::{StorageError, StorageResult},
    },
    state::puzzle::Puzzle,
};

/// Fixed set of puzzles held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuestionBank {
    puzzles: Arc<Vec<Puzzle>>,
}

impl MemoryQuestionBank {
    /// Serve `puzzles` on every load.
    pub fn new(puzzles: Vec<Puzzle>) -> Self {
        Self {
            puzzles: Arc::new(puzzles),
        }
    }
}

impl QuestionBank for MemoryQuestionBank {
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<Puzzle>>> {
        let puzzles = self.puzzles.clone();
        Box::pin(async move { Ok(puzzles.as_ref().clone()) })
    }
}

/// Leaderboard kept in memory, counting saves and able to simulate failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboardStore {
    inner: Arc<MemoryLeaderboardInner>,
}

#[derive(Debug, Default)]
struct MemoryLeaderboardInner {
    scores: Mutex<IndexMap<String, u32>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryLeaderboardStore {
    /// Start with previously persisted `scores`.
    pub fn with_scores(scores: IndexMap<String, u32>) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.inner.scores.lock() {
            *guard = scores;
        }
        store
    }

    /// Number of successful and failed save calls so far.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Last scores successfully saved.
    pub fn persisted(&self) -> IndexMap<String, u32> {
        self.inner
            .scores
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl LeaderboardStore for MemoryLeaderboardStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<IndexMap<String, u32>>> {
        let scores = self.persisted();
        Box::pin(async move { Ok(scores) })
    }

    fn save(&self, scores: IndexMap<String, u32>) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.saves.fetch_add(1, Ordering::SeqCst);
            if inner.failing.load(Ordering::SeqCst) {
                return Err(StorageError::unavailable(
                    "in-memory leaderboard configured to fail",
                    io::Error::other("simulated failure"),
                ));
            }
            let mut guard = inner.scores.lock().map_err(|_| {
                StorageError::unavailable(
                    "in-memory leaderboard lock poisoned",
                    io::Error::other("poisoned"),
                )
            })?;
            *guard = scores;
            Ok(())
        })
    }
}
